//! Definitions of errors that can occur while reading from, writing to, or recording the state of
//! the protocol's contracts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors surfaced by the chain client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The RPC transport failed, or the node returned a non-revert error
    Transport(String),
    /// The call or transaction reverted; holds the revert reason as reported by the node
    Reverted(String),
    /// The client could not be constructed
    Initialization(String),
}

impl Display for ChainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Transport(s) => write!(f, "transport error: {}", s),
            ChainError::Reverted(s) => write!(f, "reverted: {}", s),
            ChainError::Initialization(s) => write!(f, "error initializing client: {}", s),
        }
    }
}

impl Error for ChainError {}

/// Errors that can occur while batching reads through the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// No calls were given
    EmptyBatch,
    /// The target ABI has no function with the given name and arity
    UnknownFunction {
        /// The requested function name
        function: String,
        /// The number of parameters supplied
        arity: usize,
    },
    /// The parameters could not be encoded against the function's inputs
    Encode(String),
    /// The aggregate call failed as a whole
    Aggregation(ChainError),
    /// The aggregate call returned a different number of results than calls submitted
    LengthMismatch {
        /// Number of calls submitted
        expected: usize,
        /// Number of results returned
        actual: usize,
    },
    /// A raw result could not be decoded against its function's outputs
    Decode {
        /// Position of the offending call in the batch
        index: usize,
        /// Decoder message
        reason: String,
    },
}

impl Display for AggregateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::EmptyBatch => write!(f, "cannot aggregate an empty batch of calls"),
            AggregateError::UnknownFunction { function, arity } => {
                write!(f, "no function `{}` taking {} parameter(s)", function, arity)
            }
            AggregateError::Encode(s) => write!(f, "error encoding call: {}", s),
            AggregateError::Aggregation(e) => write!(f, "aggregate call failed: {}", e),
            AggregateError::LengthMismatch { expected, actual } => {
                write!(f, "expected {} results, got {}", expected, actual)
            }
            AggregateError::Decode { index, reason } => {
                write!(f, "error decoding result {}: {}", index, reason)
            }
        }
    }
}

impl Error for AggregateError {}

/// Errors that can occur while dispatching a state-changing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The function signature is malformed
    Signature(String),
    /// The parameter types or values do not line up with the signature
    Params(String),
    /// Direct execution failed on-chain
    Execution(ChainError),
    /// The pending transaction artifact could not be read or written
    Artifact(String),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Signature(s) => write!(f, "invalid function signature: {}", s),
            DispatchError::Params(s) => write!(f, "invalid parameters: {}", s),
            DispatchError::Execution(e) => write!(f, "error executing transaction: {}", e),
            DispatchError::Artifact(s) => write!(f, "error with pending transactions file: {}", s),
        }
    }
}

impl Error for DispatchError {}

/// Errors that can occur while reading or updating the deployments ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Error reading the ledger file
    Read(String),
    /// Error writing the ledger file
    Write(String),
    /// The ledger file is not a valid ledger document
    Parse(String),
    /// No entry in the collection matched the lookup key
    EntryNotFound {
        /// The collection searched
        collection: &'static str,
        /// The lookup key
        key: String,
    },
    /// A parent collection required by the operation does not exist
    ParentNotFound {
        /// The parent collection searched
        collection: &'static str,
        /// The parent's lookup key
        key: String,
    },
    /// A protocol-wide singleton address is not recorded
    MissingSingleton(&'static str),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Read(s) => write!(f, "error reading ledger: {}", s),
            LedgerError::Write(s) => write!(f, "error writing ledger: {}", s),
            LedgerError::Parse(s) => write!(f, "error parsing ledger: {}", s),
            LedgerError::EntryNotFound { collection, key } => {
                write!(f, "no entry `{}` in {}", key, collection)
            }
            LedgerError::ParentNotFound { collection, key } => {
                write!(f, "parent `{}` not found in {}", key, collection)
            }
            LedgerError::MissingSingleton(name) => write!(f, "`{}` is not recorded", name),
        }
    }
}

impl Error for LedgerError {}

/// Errors that can occur while replaying pending transactions against the timelock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    /// The transaction cannot be executed before its eta
    EtaNotReached {
        /// Description of the pending transaction
        description: String,
        /// The transaction's eta
        eta: u64,
        /// The current time
        now: u64,
    },
    /// Reading the timelock's state failed
    Read(AggregateError),
    /// Submitting to the timelock failed
    Submit(ChainError),
}

impl Display for GovernanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GovernanceError::EtaNotReached { description, eta, now } => write!(
                f,
                "`{}` is not executable until {} (now {})",
                description, eta, now
            ),
            GovernanceError::Read(e) => write!(f, "error reading timelock: {}", e),
            GovernanceError::Submit(e) => write!(f, "error submitting to timelock: {}", e),
        }
    }
}

impl Error for GovernanceError {}
