//! Constants used in the deployment scripts

/// The default RPC url
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default directory holding one ledger file per network
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";

/// The default directory pending timelock transactions are written to
pub const DEFAULT_RESULTS_DIR: &str = "deployments/results";

/// The signature of a worker's strategy allowlist setter
pub const SET_STRATEGY_OK_SIGNATURE: &str = "setStrategyOk(address[],bool)";

/// The parameter types of a worker's strategy allowlist setter
pub const SET_STRATEGY_OK_PARAM_TYPES: [&str; 2] = ["address[]", "bool"];
