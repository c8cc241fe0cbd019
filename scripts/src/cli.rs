//! Definitions of CLI arguments and commands for the deployment scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use orchestrator::{constants::DEFAULT_CONFIRMATIONS, ledger::Singleton};

use crate::{
    commands::{
        dispatch, execute_batch, lookup, owners, queue_batch, record_singleton, record_token,
        record_vault, record_worker, set_worker_strategies,
    },
    constants::{DEFAULT_DEPLOYMENTS_DIR, DEFAULT_RESULTS_DIR, DEFAULT_RPC_URL},
    errors::ScriptError,
    utils::RunContext,
};

/// Deploy, configure, and upgrade the protocol's contracts
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY", default_value = "")]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Name of the network, selecting its ledger file
    #[arg(short, long, env = "NETWORK")]
    pub network: String,

    /// Directory holding one ledger file per network
    #[arg(long, env = "DEPLOYMENTS_DIR", default_value = DEFAULT_DEPLOYMENTS_DIR)]
    pub deployments_dir: PathBuf,

    /// Directory pending timelock transactions are written to
    #[arg(long, env = "RESULTS_DIR", default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: PathBuf,

    /// Number of confirmations to wait for on each transaction
    #[arg(long, default_value_t = DEFAULT_CONFIRMATIONS)]
    pub confirmations: u64,

    /// The script to run
    #[command(subcommand)]
    pub command: Command,
}

/// The available scripts
#[derive(Subcommand)]
pub enum Command {
    /// Read the owners of several contracts in one batch
    Owners(OwnersArgs),
    /// Call a function, through the timelock if the target is owned by it
    Dispatch(DispatchArgs),
    /// Allow or disallow strategies on a worker
    SetWorkerStrategies(SetWorkerStrategiesArgs),
    /// Record a token in the ledger
    RecordToken(RecordTokenArgs),
    /// Record a vault in the ledger
    RecordVault(RecordVaultArgs),
    /// Record a worker of a vault in the ledger
    RecordWorker(RecordWorkerArgs),
    /// Record a protocol-wide address in the ledger
    RecordSingleton(RecordSingletonArgs),
    /// Print a ledger entry
    Lookup(LookupArgs),
    /// Queue a file of pending transactions in the timelock
    QueueBatch(BatchArgs),
    /// Execute a file of queued transactions through the timelock
    ExecuteBatch(BatchArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self, ctx: &RunContext) -> Result<(), ScriptError> {
        match self {
            Command::Owners(args) => owners(args, ctx).await,
            Command::Dispatch(args) => dispatch(args, ctx).await,
            Command::SetWorkerStrategies(args) => set_worker_strategies(args, ctx).await,
            Command::RecordToken(args) => record_token(args, ctx),
            Command::RecordVault(args) => record_vault(args, ctx),
            Command::RecordWorker(args) => record_worker(args, ctx),
            Command::RecordSingleton(args) => record_singleton(args, ctx),
            Command::Lookup(args) => lookup(args, ctx),
            Command::QueueBatch(args) => queue_batch(args, ctx).await,
            Command::ExecuteBatch(args) => execute_batch(args, ctx).await,
        }
    }
}

/// Read the owners of several contracts
#[derive(Args)]
pub struct OwnersArgs {
    /// Ledger keys (name, symbol, or address) of the contracts
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Block number to read at, defaults to the latest block
    #[arg(short, long)]
    pub block: Option<u64>,
}

/// When a call queued for the timelock becomes executable
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct EtaArgs {
    /// Unix time at which the call becomes executable
    #[arg(long)]
    pub eta: Option<u64>,

    /// Seconds from now at which the call becomes executable
    #[arg(long)]
    pub eta_in: Option<u64>,
}

/// Call a function on a contract
#[derive(Args)]
pub struct DispatchArgs {
    /// Ledger key (name, symbol, or address) of the target contract
    #[arg(short, long)]
    pub target: String,

    /// Function signature, e.g. `setParams(uint256,bool)`
    #[arg(short, long)]
    pub signature: String,

    /// ABI type of each parameter, in order
    #[arg(long = "param-type")]
    pub param_types: Vec<String>,

    /// Value of each parameter, in order, e.g. `42`, `[0xab..,0xcd..]`, `(1,true)`
    #[arg(long = "param-value")]
    pub param_values: Vec<String>,

    /// What the call does
    #[arg(short, long)]
    pub description: String,

    /// Native value to attach, in wei
    #[arg(long)]
    pub value: Option<String>,

    /// When a queued call becomes executable
    #[command(flatten)]
    pub eta: EtaArgs,

    /// Title of the run, naming the pending transactions file
    #[arg(long)]
    pub title: String,
}

/// Allow or disallow strategies on a worker
#[derive(Args)]
pub struct SetWorkerStrategiesArgs {
    /// Ledger key of the vault the worker belongs to
    #[arg(long)]
    pub vault: String,

    /// Ledger key of the worker
    #[arg(long)]
    pub worker: String,

    /// Strategy addresses, or shared strategies as `<group>.<kind>`
    #[arg(long = "strategy", required = true)]
    pub strategies: Vec<String>,

    /// Disallow the strategies instead of allowing them
    #[arg(long)]
    pub disable: bool,

    /// When a queued call becomes executable
    #[command(flatten)]
    pub eta: EtaArgs,

    /// Title of the run, naming the pending transactions file
    #[arg(long)]
    pub title: String,
}

/// Record a token
#[derive(Args)]
pub struct RecordTokenArgs {
    /// Token name
    #[arg(long)]
    pub name: String,

    /// Token symbol
    #[arg(long)]
    pub symbol: String,

    /// Token address
    #[arg(long)]
    pub address: String,

    /// Block the token was deployed in
    #[arg(long, default_value_t = 0)]
    pub deployed_block: u64,

    /// Token decimals
    #[arg(long)]
    pub decimals: Option<u8>,
}

/// Record a vault
#[derive(Args)]
pub struct RecordVaultArgs {
    /// Vault name
    #[arg(long)]
    pub name: String,

    /// Symbol of the vault's interest-bearing token
    #[arg(long)]
    pub symbol: String,

    /// Vault address
    #[arg(long)]
    pub address: String,

    /// Block the vault was deployed in
    #[arg(long)]
    pub deployed_block: u64,

    /// Ledger key or address of the token lent by the vault
    #[arg(long)]
    pub base_token: String,

    /// Debt token address
    #[arg(long)]
    pub debt_token: Option<String>,

    /// Vault config address
    #[arg(long)]
    pub config: Option<String>,

    /// Interest rate model address
    #[arg(long)]
    pub triple_slope_model: Option<String>,
}

/// Record a worker
#[derive(Args)]
pub struct RecordWorkerArgs {
    /// Ledger key of the vault the worker belongs to
    #[arg(long)]
    pub vault: String,

    /// Worker name
    #[arg(long)]
    pub name: String,

    /// Worker address
    #[arg(long)]
    pub address: String,

    /// Block the worker was deployed in
    #[arg(long)]
    pub deployed_block: u64,

    /// Staking pool id
    #[arg(long)]
    pub pid: u64,

    /// LP token staked by the worker
    #[arg(long)]
    pub staking_token: String,

    /// Contract the staking token is staked at
    #[arg(long)]
    pub staking_token_at: Option<String>,

    /// Worker config address
    #[arg(long)]
    pub config: Option<String>,

    /// Strategies the worker may call; keeps the recorded ones if omitted
    #[arg(long = "strategy")]
    pub strategies: Vec<String>,
}

/// The protocol-wide addresses
#[derive(ValueEnum, Copy, Clone)]
pub enum SingletonArg {
    /// The proxy admin
    ProxyAdmin,
    /// The timelock
    Timelock,
    /// The multicall contract
    Multicall,
}

impl From<SingletonArg> for Singleton {
    fn from(arg: SingletonArg) -> Self {
        match arg {
            SingletonArg::ProxyAdmin => Singleton::ProxyAdmin,
            SingletonArg::Timelock => Singleton::Timelock,
            SingletonArg::Multicall => Singleton::Multicall,
        }
    }
}

/// Record a protocol-wide address
#[derive(Args)]
pub struct RecordSingletonArgs {
    /// Which address to record
    #[arg(value_enum)]
    pub singleton: SingletonArg,

    /// The address
    pub address: String,
}

/// Print a ledger entry
#[derive(Args)]
pub struct LookupArgs {
    /// Name, symbol, or address of the entry
    pub key: String,

    /// Look among the workers of this vault
    #[arg(long)]
    pub vault: Option<String>,
}

/// A file of pending transactions
#[derive(Args)]
pub struct BatchArgs {
    /// Path to the pending transactions file
    pub file: PathBuf,
}
