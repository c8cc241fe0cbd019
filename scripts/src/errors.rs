//! Definitions of errors that can occur during the execution of the deployment scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use orchestrator::errors::{
    AggregateError, ChainError, DispatchError, GovernanceError, LedgerError,
};

/// Errors that can occur during the execution of the deployment scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error parsing a command line argument
    InvalidArgument(String),
    /// Error initializing the RPC client or talking to the chain
    Chain(ChainError),
    /// Error reading on-chain state
    Read(AggregateError),
    /// Error dispatching a call
    Dispatch(DispatchError),
    /// Error reading or writing the ledger
    Ledger(LedgerError),
    /// Error submitting to the timelock
    Governance(GovernanceError),
    /// Error serializing output
    Serde(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::InvalidArgument(s) => write!(f, "invalid argument: {}", s),
            ScriptError::Chain(e) => write!(f, "{}", e),
            ScriptError::Read(e) => write!(f, "error reading chain state: {}", e),
            ScriptError::Dispatch(e) => write!(f, "{}", e),
            ScriptError::Ledger(e) => write!(f, "{}", e),
            ScriptError::Governance(e) => write!(f, "{}", e),
            ScriptError::Serde(s) => write!(f, "error serializing output: {}", s),
        }
    }
}

impl Error for ScriptError {}

impl From<ChainError> for ScriptError {
    fn from(e: ChainError) -> Self {
        ScriptError::Chain(e)
    }
}

impl From<AggregateError> for ScriptError {
    fn from(e: AggregateError) -> Self {
        ScriptError::Read(e)
    }
}

impl From<DispatchError> for ScriptError {
    fn from(e: DispatchError) -> Self {
        ScriptError::Dispatch(e)
    }
}

impl From<LedgerError> for ScriptError {
    fn from(e: LedgerError) -> Self {
        ScriptError::Ledger(e)
    }
}

impl From<GovernanceError> for ScriptError {
    fn from(e: GovernanceError) -> Self {
        ScriptError::Governance(e)
    }
}
