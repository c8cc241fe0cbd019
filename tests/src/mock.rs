//! An in-memory chain client with canned read results

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{keccak256, Address, Bytes, Selector},
    rpc::types::BlockId,
};
use orchestrator::{errors::ChainError, ChainClient, RawCall, RawTransaction, TxReceipt};

/// The revert reason reported for calls against reverting targets
pub const REVERT_REASON: &str = "execution reverted: Ownable: caller is not the owner";

/// The selector of `owner()`
pub fn owner_selector() -> Selector {
    Selector::from_slice(&keccak256("owner()")[..4])
}

/// ABI-encode the return values of a function
pub fn encode_return(values: Vec<DynSolValue>) -> Bytes {
    DynSolValue::Tuple(values).abi_encode_params().into()
}

/// A chain client that answers reads from a table and records the transactions it is sent
#[derive(Default)]
pub struct MockChainClient {
    /// The signer address
    signer: Address,
    /// The signer's transaction count before the test
    tx_count: u64,
    /// Raw return data by target and selector
    responses: HashMap<(Address, Selector), Bytes>,
    /// The owner of each contract answering `owner()`
    owners: HashMap<Address, Address>,
    /// Targets every read and transaction against which reverts
    reverting: HashSet<Address>,
    /// The block each aggregate call was pinned to
    aggregated_at: Mutex<Vec<Option<BlockId>>>,
    /// The transactions sent so far
    sent: Mutex<Vec<RawTransaction>>,
}

impl MockChainClient {
    /// A client signing as `signer`, which has sent `tx_count` transactions
    pub fn new(signer: Address, tx_count: u64) -> Self {
        Self {
            signer,
            tx_count,
            ..Default::default()
        }
    }

    /// Answer `selector` on `target` with `data`
    pub fn with_response(mut self, target: Address, selector: Selector, data: Bytes) -> Self {
        self.responses.insert((target, selector), data);
        self
    }

    /// Answer `owner()` on `target` with `owner`
    pub fn with_owner(mut self, target: Address, owner: Address) -> Self {
        self.owners.insert(target, owner);
        self
    }

    /// Revert every read and transaction against `target`
    pub fn with_reverting(mut self, target: Address) -> Self {
        self.reverting.insert(target);
        self
    }

    /// The transactions sent so far
    pub fn sent(&self) -> Vec<RawTransaction> {
        self.sent.lock().unwrap().clone()
    }

    /// The block each aggregate call was pinned to
    pub fn aggregated_at(&self) -> Vec<Option<BlockId>> {
        self.aggregated_at.lock().unwrap().clone()
    }

    /// Answer one read
    fn answer(&self, call: &RawCall) -> Result<Bytes, ChainError> {
        if self.reverting.contains(&call.target) {
            return Err(ChainError::Reverted(REVERT_REASON.to_string()));
        }

        let selector = Selector::from_slice(&call.call_data[..4]);
        if selector == owner_selector() {
            if let Some(owner) = self.owners.get(&call.target) {
                return Ok(encode_return(vec![DynSolValue::Address(*owner)]));
            }
        }

        self.responses
            .get(&(call.target, selector))
            .cloned()
            .ok_or_else(|| ChainError::Reverted("execution reverted".to_string()))
    }
}

impl ChainClient for MockChainClient {
    fn signer(&self) -> Address {
        self.signer
    }

    async fn aggregate(
        &self,
        calls: Vec<RawCall>,
        at_block: Option<BlockId>,
    ) -> Result<Vec<Bytes>, ChainError> {
        self.aggregated_at.lock().unwrap().push(at_block);
        calls.iter().map(|call| self.answer(call)).collect()
    }

    async fn transaction_count(&self, _account: Address) -> Result<u64, ChainError> {
        Ok(self.tx_count)
    }

    async fn send_transaction(&self, tx: RawTransaction) -> Result<TxReceipt, ChainError> {
        if self.reverting.contains(&tx.target) {
            return Err(ChainError::Reverted(REVERT_REASON.to_string()));
        }

        let receipt = TxReceipt {
            transaction_hash: keccak256(tx.nonce.to_be_bytes()),
            block_number: Some(1),
            nonce: tx.nonce,
            gas_used: 21_000,
        };
        self.sent.lock().unwrap().push(tx);
        Ok(receipt)
    }

    async fn owner_of(&self, target: Address) -> Result<Address, ChainError> {
        self.owners
            .get(&target)
            .copied()
            .ok_or_else(|| ChainError::Reverted("execution reverted".to_string()))
    }
}
