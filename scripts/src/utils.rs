//! Utilities for the deploy scripts.

use std::{path::PathBuf, str::FromStr};

use alloy::primitives::{Address, U256};
use orchestrator::{
    governance::now_seconds,
    ledger::{Ledger, StrategyGroupEntry},
    RpcChainClient,
};

use crate::{cli::EtaArgs, errors::ScriptError};

/// The settings shared by every command of a run
#[derive(Clone, Debug)]
pub struct RunContext {
    /// Private key of the deployer
    pub priv_key: String,
    /// Network RPC URL
    pub rpc_url: String,
    /// Name of the network, selecting its ledger file
    pub network: String,
    /// Directory holding one ledger file per network
    pub deployments_dir: PathBuf,
    /// Directory pending timelock transactions are written to
    pub results_dir: PathBuf,
    /// Number of confirmations to wait for on each transaction
    pub confirmations: u64,
}

impl RunContext {
    /// The ledger file of the selected network
    pub fn ledger_path(&self) -> PathBuf {
        Ledger::path_for(&self.deployments_dir, &self.network)
    }

    /// Load the ledger of the selected network
    pub fn open_ledger(&self) -> Result<Ledger, ScriptError> {
        Ok(Ledger::open(self.ledger_path())?)
    }
}

/// Sets up a signing client, reading through the given multicall contract
pub fn setup_client(ctx: &RunContext, multicall: Address) -> Result<RpcChainClient, ScriptError> {
    Ok(RpcChainClient::new(
        &ctx.priv_key,
        &ctx.rpc_url,
        multicall,
        ctx.confirmations,
    )?)
}

/// Parse an address argument
pub fn parse_address(s: &str) -> Result<Address, ScriptError> {
    Address::from_str(s).map_err(|e| ScriptError::InvalidArgument(format!("`{}`: {}", s, e)))
}

/// Parse an optional address argument
pub fn parse_optional_address(s: Option<&str>) -> Result<Option<Address>, ScriptError> {
    s.map(parse_address).transpose()
}

/// Parse a wei amount, in decimal or `0x`-prefixed hex, defaulting to zero
pub fn parse_value(s: Option<&str>) -> Result<U256, ScriptError> {
    match s {
        Some(s) => U256::from_str(s)
            .map_err(|e| ScriptError::InvalidArgument(format!("value `{}`: {}", s, e))),
        None => Ok(U256::ZERO),
    }
}

/// The absolute eta requested on the command line
pub fn resolve_eta(args: &EtaArgs) -> Result<u64, ScriptError> {
    match (args.eta, args.eta_in) {
        (Some(eta), None) => Ok(eta),
        (None, Some(delay)) => Ok(now_seconds().saturating_add(delay)),
        _ => Err(ScriptError::InvalidArgument(
            "exactly one of --eta or --eta-in is required".to_string(),
        )),
    }
}

/// Resolve a strategy argument: an address, or a shared strategy given as `<group>.<kind>`
pub fn resolve_strategy(ledger: &Ledger, key: &str) -> Result<Address, ScriptError> {
    if let Ok(address) = Address::from_str(key) {
        return Ok(address);
    }

    let (group, kind) = key.split_once('.').ok_or_else(|| {
        ScriptError::InvalidArgument(format!(
            "strategy `{}` is neither an address nor `<group>.<kind>`",
            key
        ))
    })?;
    let entry = ledger.find::<StrategyGroupEntry>(&(), group)?;
    entry.strategies.get(kind).copied().ok_or_else(|| {
        ScriptError::InvalidArgument(format!("strategy group `{}` has no `{}`", group, kind))
    })
}
