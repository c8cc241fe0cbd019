//! The governance-gated dispatcher routes each state-changing call either straight to its
//! target or, when the target is owned by the timelock, into the run's batch of pending
//! timelock transactions.

use std::path::{Path, PathBuf};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use tracing::info;

use crate::{
    aggregator::CallAggregator,
    chain::{ChainClient, RawTransaction, TxReceipt},
    errors::{AggregateError, DispatchError},
};

pub mod encoding;
mod nonce;
mod pending;

pub use nonce::NonceAllocator;
pub use pending::{PendingBatch, PendingTransaction};

use encoding::{encode_call, value_to_json};

/// A state-changing call to route
#[derive(Clone, Debug, Default)]
pub struct DispatchRequest {
    /// The contract to call
    pub target: Address,
    /// The current on-chain owner of `target`, read fresh for this run
    pub owner: Address,
    /// The function signature, e.g. `setStrategyOk(address[],bool)`
    pub signature: String,
    /// The ABI types of the parameters
    pub param_types: Vec<String>,
    /// The parameters
    pub param_values: Vec<DynSolValue>,
    /// What the call does, for logs and the pending transactions file
    pub description: String,
    /// The native value to attach
    pub value: U256,
    /// The unix time at which a queued call becomes executable; unused when executed directly
    pub eta: u64,
}

/// How a dispatched call was handled
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    /// The target is timelock-owned; the call was recorded for the timelock
    Queued(PendingTransaction),
    /// The call was sent and confirmed
    Executed(TxReceipt),
}

/// Routes calls for one signer during one run
pub struct Dispatcher<'a, C> {
    /// The client direct calls are sent through
    client: &'a C,
    /// The timelock address
    governance: Address,
    /// The signer's nonces
    nonces: NonceAllocator,
    /// Calls queued for the timelock so far
    pending: PendingBatch,
}

impl<'a, C: ChainClient> Dispatcher<'a, C> {
    /// Create a dispatcher
    pub fn new(
        client: &'a C,
        governance: Address,
        nonces: NonceAllocator,
        pending: PendingBatch,
    ) -> Self {
        Self {
            client,
            governance,
            nonces,
            pending,
        }
    }

    /// The timelock address
    pub fn governance(&self) -> Address {
        self.governance
    }

    /// Whether a contract with the given owner must be changed through the timelock
    pub fn is_governed(&self, owner: Address) -> bool {
        owner == self.governance
    }

    /// Read the current owner of `target` through the aggregator
    pub async fn current_owner(&self, target: Address) -> Result<Address, AggregateError> {
        CallAggregator::new(self.client)
            .owners(&[target], None /* at_block */)
            .await?
            .into_iter()
            .next()
            .ok_or(AggregateError::LengthMismatch {
                expected: 1,
                actual: 0,
            })
    }

    /// Dispatch a call.
    ///
    /// The call is encoded and validated first, so malformed calls fail before anything is
    /// sent. A call whose owner is the timelock is appended to the pending batch with the
    /// requested eta; any other call is sent with the next nonce and awaited.
    pub async fn dispatch(
        &mut self,
        request: DispatchRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let encoded = encode_call(
            &request.signature,
            &request.param_types,
            &request.param_values,
        )?;

        info!("{}", request.description);

        if self.is_governed(request.owner) {
            let pending = PendingTransaction {
                description: request.description,
                target: request.target,
                value: request.value,
                signature: encoded.signature,
                param_types: request.param_types,
                param_values: request.param_values.iter().map(value_to_json).collect(),
                eta: request.eta,
                data: encoded.params,
            };
            self.pending.push(pending.clone());

            info!("✅ Queued for the timelock with eta {}", pending.eta);
            return Ok(DispatchOutcome::Queued(pending));
        }

        let tx = RawTransaction {
            target: request.target,
            value: request.value,
            data: encoded.calldata(),
            nonce: self.nonces.next_nonce(),
        };
        let receipt = self
            .client
            .send_transaction(tx)
            .await
            .map_err(DispatchError::Execution)?;

        info!("✅ Executed in {:#x}", receipt.transaction_hash);
        Ok(DispatchOutcome::Executed(receipt))
    }

    /// The signer's nonces, for sending other transactions in sequence with dispatched ones
    pub fn nonces_mut(&mut self) -> &mut NonceAllocator {
        &mut self.nonces
    }

    /// The calls queued for the timelock so far
    pub fn pending(&self) -> &PendingBatch {
        &self.pending
    }

    /// Write the run's pending transactions into `dir`
    pub fn flush_pending(&self, dir: &Path) -> Result<Option<PathBuf>, DispatchError> {
        self.pending.write_to(dir)
    }
}
