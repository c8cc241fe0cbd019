//! Replaying recorded pending transactions against the timelock

use std::{
    fmt::{self, Display},
    sync::Arc,
};

use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, Bytes, U256},
    sol_types::SolCall,
};
use jiff::Timestamp;
use tracing::{info, warn};

use crate::{
    aggregator::{CallAggregator, CallSpec, ContractHandle},
    chain::{ChainClient, RawTransaction, TxReceipt},
    constants::TIMELOCK_DELAY_FN,
    dispatcher::{NonceAllocator, PendingTransaction},
    errors::{AggregateError, GovernanceError},
    solidity::ITimelock,
};

/// The current unix time in seconds
pub fn now_seconds() -> u64 {
    u64::try_from(Timestamp::now().as_second()).unwrap_or_default()
}

/// Which timelock entrypoint to submit pending transactions to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimelockAction {
    /// `queueTransaction`, starting the delay
    Queue,
    /// `executeTransaction`, once the eta has passed
    Execute,
}

impl Display for TimelockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelockAction::Queue => write!(f, "queue"),
            TimelockAction::Execute => write!(f, "execute"),
        }
    }
}

/// Call data for `queueTransaction` of a pending transaction
pub fn queue_calldata(tx: &PendingTransaction) -> Bytes {
    ITimelock::queueTransactionCall {
        target: tx.target,
        value: tx.value,
        signature: tx.signature.clone(),
        data: tx.data.clone(),
        eta: U256::from(tx.eta),
    }
    .abi_encode()
    .into()
}

/// Call data for `executeTransaction` of a pending transaction
pub fn execute_calldata(tx: &PendingTransaction) -> Bytes {
    ITimelock::executeTransactionCall {
        target: tx.target,
        value: tx.value,
        signature: tx.signature.clone(),
        data: tx.data.clone(),
        eta: U256::from(tx.eta),
    }
    .abi_encode()
    .into()
}

/// A timelock contract
pub struct Timelock<'a, C> {
    /// The client used to read from and submit to the timelock
    client: &'a C,
    /// The timelock's address
    address: Address,
}

impl<'a, C: ChainClient> Timelock<'a, C> {
    /// Create a handle to the timelock at `address`
    pub fn new(client: &'a C, address: Address) -> Self {
        Self { client, address }
    }

    /// The minimum delay, in seconds, between queueing and executing a transaction
    pub async fn delay(&self) -> Result<u64, GovernanceError> {
        let handle = ContractHandle::new(
            self.address,
            Arc::new(
                JsonAbi::parse([TIMELOCK_DELAY_FN])
                    .map_err(|e| GovernanceError::Read(AggregateError::Encode(e.to_string())))?,
            ),
        );

        let res = CallAggregator::new(self.client)
            .aggregate(&[CallSpec::new(handle, "delay", vec![])], None /* at_block */)
            .await
            .map_err(GovernanceError::Read)?;

        res.get(0)
            .and_then(|decoded| decoded.as_uint())
            .map(|delay| delay.saturating_to::<u64>())
            .ok_or(GovernanceError::Read(AggregateError::Decode {
                index: 0,
                reason: "delay() did not return an integer".to_string(),
            }))
    }

    /// Warn about pending transactions whose eta is earlier than the timelock will accept,
    /// returning how many there are. The timelock itself enforces the delay.
    pub fn check_etas(&self, txs: &[PendingTransaction], now: u64, delay: u64) -> usize {
        let earliest = now.saturating_add(delay);
        txs.iter()
            .filter(|tx| tx.eta < earliest)
            .inspect(|tx| {
                warn!(
                    "`{}` has eta {} but the timelock accepts no earlier than {}",
                    tx.description, tx.eta, earliest
                )
            })
            .count()
    }

    /// Submit every transaction in order to the given timelock entrypoint, each with the next
    /// nonce.
    ///
    /// When executing, every eta is checked against `now` before anything is sent.
    pub async fn submit_batch(
        &self,
        action: TimelockAction,
        txs: &[PendingTransaction],
        nonces: &mut NonceAllocator,
        now: u64,
    ) -> Result<Vec<TxReceipt>, GovernanceError> {
        if action == TimelockAction::Execute {
            if let Some(tx) = txs.iter().find(|tx| tx.eta > now) {
                return Err(GovernanceError::EtaNotReached {
                    description: tx.description.clone(),
                    eta: tx.eta,
                    now,
                });
            }
        }

        let mut receipts = Vec::with_capacity(txs.len());
        for tx in txs {
            info!("Submitting `{}` to the timelock ({})", tx.description, action);

            let (data, value) = match action {
                TimelockAction::Queue => (queue_calldata(tx), U256::ZERO),
                TimelockAction::Execute => (execute_calldata(tx), tx.value),
            };
            let receipt = self
                .client
                .send_transaction(RawTransaction {
                    target: self.address,
                    value,
                    data,
                    nonce: nonces.next_nonce(),
                })
                .await
                .map_err(GovernanceError::Submit)?;

            info!("✅ Done in {:#x}", receipt.transaction_hash);
            receipts.push(receipt);
        }

        Ok(receipts)
    }
}
