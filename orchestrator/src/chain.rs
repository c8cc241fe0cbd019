//! The chain client capability: batched reads, signed transaction submission, and ownership
//! reads, together with its RPC-backed implementation

use std::str::FromStr;

use alloy::{
    contract::Error as ContractError,
    network::TransactionBuilder,
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{BlockId, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::{http::reqwest::Url, RpcError, TransportError},
};
use serde::Serialize;
use tracing::debug;

use crate::{
    errors::ChainError,
    solidity::{IMulticall, IOwnable},
};

/// A single read to be batched: raw call data against a target
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCall {
    /// The contract to call
    pub target: Address,
    /// The ABI-encoded call, selector included
    pub call_data: Bytes,
}

/// A state-changing transaction ready to be signed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTransaction {
    /// The contract to call
    pub target: Address,
    /// The native value attached to the call
    pub value: U256,
    /// The ABI-encoded call, selector included
    pub data: Bytes,
    /// The signer's sequence number for this transaction
    pub nonce: u64,
}

/// The receipt of a confirmed transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    /// The transaction hash
    pub transaction_hash: TxHash,
    /// The block the transaction was included in
    pub block_number: Option<u64>,
    /// The nonce the transaction was sent with
    pub nonce: u64,
    /// The gas consumed by the transaction
    pub gas_used: u64,
}

/// The operations the orchestrator needs from a chain.
///
/// Every method is a suspension point; callers await each one before issuing the next
/// dependent call, so implementations are not required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// The address transactions are signed by
    fn signer(&self) -> Address;

    /// Execute all calls in one read-only aggregate call, optionally pinned to a block,
    /// returning the raw return data of each call in order.
    ///
    /// Fails as a whole if any call reverts.
    async fn aggregate(
        &self,
        calls: Vec<RawCall>,
        at_block: Option<BlockId>,
    ) -> Result<Vec<Bytes>, ChainError>;

    /// The number of transactions sent from `account`, i.e. its next nonce
    async fn transaction_count(&self, account: Address) -> Result<u64, ChainError>;

    /// Sign and submit a transaction, waiting for it to be confirmed
    async fn send_transaction(&self, tx: RawTransaction) -> Result<TxReceipt, ChainError>;

    /// Read the `owner()` of a contract
    async fn owner_of(&self, target: Address) -> Result<Address, ChainError>;
}

/// A [`ChainClient`] backed by a JSON-RPC node and a local private key
#[derive(Clone)]
pub struct RpcChainClient {
    /// The signing provider
    provider: DynProvider,
    /// The address of the signer
    signer: Address,
    /// The address of the multicall contract used for aggregate reads
    multicall: Address,
    /// The number of confirmations to wait for on each transaction
    confirmations: u64,
}

impl RpcChainClient {
    /// Sets up a signing client against the given RPC url
    pub fn new(
        priv_key: &str,
        rpc_url: &str,
        multicall: Address,
        confirmations: u64,
    ) -> Result<Self, ChainError> {
        let signer = PrivateKeySigner::from_str(priv_key)
            .map_err(|e| ChainError::Initialization(e.to_string()))?;
        let url = Url::parse(rpc_url).map_err(|e| ChainError::Initialization(e.to_string()))?;

        let signer_address = signer.address();
        let provider = ProviderBuilder::new().wallet(signer).connect_http(url);

        Ok(Self {
            provider: DynProvider::new(provider),
            signer: signer_address,
            multicall,
            confirmations,
        })
    }
}

impl ChainClient for RpcChainClient {
    fn signer(&self) -> Address {
        self.signer
    }

    async fn aggregate(
        &self,
        calls: Vec<RawCall>,
        at_block: Option<BlockId>,
    ) -> Result<Vec<Bytes>, ChainError> {
        let multicall = IMulticall::new(self.multicall, self.provider.clone());
        let calls = calls
            .into_iter()
            .map(|call| IMulticall::Call {
                target: call.target,
                callData: call.call_data,
            })
            .collect::<Vec<_>>();

        let mut call = multicall.aggregate(calls);
        if let Some(block) = at_block {
            call = call.block(block);
        }

        let res = call.call().await.map_err(contract_error)?;
        debug!("aggregate call observed block {}", res.blockNumber);
        Ok(res.returnData)
    }

    async fn transaction_count(&self, account: Address) -> Result<u64, ChainError> {
        self.provider
            .get_transaction_count(account)
            .await
            .map_err(rpc_error)
    }

    async fn send_transaction(&self, tx: RawTransaction) -> Result<TxReceipt, ChainError> {
        let request = TransactionRequest::default()
            .with_from(self.signer)
            .with_to(tx.target)
            .with_value(tx.value)
            .with_input(tx.data)
            .with_nonce(tx.nonce);

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(rpc_error)?;

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        if !receipt.status() {
            return Err(ChainError::Reverted(format!(
                "transaction {:#x} reverted",
                receipt.transaction_hash
            )));
        }

        Ok(TxReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            nonce: tx.nonce,
            gas_used: receipt.gas_used,
        })
    }

    async fn owner_of(&self, target: Address) -> Result<Address, ChainError> {
        IOwnable::new(target, self.provider.clone())
            .owner()
            .call()
            .await
            .map_err(contract_error)
    }
}

/// Map an RPC error, keeping the node's message for error responses (which carry revert reasons)
fn rpc_error(err: TransportError) -> ChainError {
    match err {
        RpcError::ErrorResp(payload) => ChainError::Reverted(payload.message.to_string()),
        other => ChainError::Transport(other.to_string()),
    }
}

/// Map a contract call error
fn contract_error(err: ContractError) -> ChainError {
    match err {
        ContractError::TransportError(e) => rpc_error(e),
        other => ChainError::Transport(other.to_string()),
    }
}
