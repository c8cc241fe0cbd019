//! Constants used throughout the orchestrator

/// The number of confirmations to wait for a directly executed transaction
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// The human-readable ABI of the `owner()` accessor shared by ownable contracts
pub const OWNER_FN: &str = "function owner() external view returns (address)";

/// The human-readable ABI of the timelock's `delay()` accessor
pub const TIMELOCK_DELAY_FN: &str = "function delay() external view returns (uint256)";

/// The file extension of ledger and pending transaction files
pub const JSON_EXTENSION: &str = "json";

/// The extension of the scratch file a ledger is written to before replacing the original
pub const TEMP_EXTENSION: &str = "json.tmp";

// --- Ledger keys --- //

/// The proxy admin singleton key in the ledger file
pub const PROXY_ADMIN_KEY: &str = "ProxyAdmin";

/// The timelock (governance) singleton key in the ledger file
pub const TIMELOCK_KEY: &str = "Timelock";

/// The multicall singleton key in the ledger file
pub const MULTICALL_KEY: &str = "Multicall";

/// The tokens collection key in the ledger file
pub const TOKENS_KEY: &str = "Tokens";

/// The vaults collection key in the ledger file
pub const VAULTS_KEY: &str = "Vaults";

/// The per-vault workers collection key in the ledger file
pub const WORKERS_KEY: &str = "workers";

/// The delta neutral vaults collection key in the ledger file
pub const DELTA_VAULTS_KEY: &str = "DeltaNeutralVaults";

/// The shared strategies collection key in the ledger file
pub const SHARED_STRATEGIES_KEY: &str = "SharedStrategies";
