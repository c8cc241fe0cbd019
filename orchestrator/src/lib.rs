//! Deployment orchestration for a multi-contract protocol: batched chain reads, timelock-gated
//! writes, and the per-network deployments ledger.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod aggregator;
pub mod chain;
pub mod constants;
pub mod dispatcher;
pub mod errors;
pub mod governance;
pub mod ledger;
mod solidity;

pub use aggregator::{AggregatedResult, CallAggregator, CallSpec, ContractHandle, Decoded};
pub use chain::{ChainClient, RawCall, RawTransaction, RpcChainClient, TxReceipt};
pub use dispatcher::{
    DispatchOutcome, DispatchRequest, Dispatcher, NonceAllocator, PendingBatch,
    PendingTransaction,
};
pub use ledger::Ledger;
