//! The kinds of entries recorded in the ledger

use std::collections::BTreeMap;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys not modeled by an entry, kept so they survive a rewrite
pub type Extra = Map<String, Value>;

/// The identity shared by every ledger entry
pub trait LedgerEntry {
    /// The display name of the entry
    fn name(&self) -> &str;

    /// The entry's symbol, if it has one
    fn symbol(&self) -> Option<&str> {
        None
    }

    /// The entry's address, if it is a single contract
    fn address(&self) -> Option<Address> {
        None
    }
}

/// A token the protocol interacts with
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEntry {
    /// The token's name
    pub name: String,
    /// The token's symbol
    pub symbol: String,
    /// The token's address
    pub address: Address,
    /// The block the token was deployed in, zero if it is external
    #[serde(default)]
    pub deployed_block: u64,
    /// The token's decimals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    /// Unmodeled keys
    #[serde(flatten)]
    pub extra: Extra,
}

impl LedgerEntry for TokenEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> Option<&str> {
        Some(&self.symbol)
    }

    fn address(&self) -> Option<Address> {
        Some(self.address)
    }
}

/// A lending vault and the workers allowed to borrow from it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    /// The vault's name
    pub name: String,
    /// The symbol of the vault's interest-bearing token
    pub symbol: String,
    /// The vault proxy's address
    pub address: Address,
    /// The block the vault was deployed in
    pub deployed_block: u64,
    /// The token lent out by the vault
    pub base_token: Address,
    /// The debt token staked on behalf of borrowers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_token: Option<Address>,
    /// The vault's config contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Address>,
    /// The interest rate model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triple_slope_model: Option<Address>,
    /// Workers that borrow from this vault
    #[serde(default)]
    pub workers: Vec<WorkerEntry>,
    /// Unmodeled keys
    #[serde(flatten)]
    pub extra: Extra,
}

impl LedgerEntry for VaultEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> Option<&str> {
        Some(&self.symbol)
    }

    fn address(&self) -> Option<Address> {
        Some(self.address)
    }
}

/// A worker farming one staking pool with funds borrowed from its vault
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerEntry {
    /// The worker's name
    pub name: String,
    /// The worker proxy's address
    pub address: Address,
    /// The block the worker was deployed in
    pub deployed_block: u64,
    /// The worker's config contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Address>,
    /// The staking pool id
    #[serde(rename = "pId")]
    pub p_id: u64,
    /// The LP token staked by the worker
    pub staking_token: Address,
    /// The contract the staking token is staked at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staking_token_at: Option<Address>,
    /// Strategies the worker is allowed to call; a copy of the worker's on-chain allowlist
    #[serde(default)]
    pub strategies: Vec<Address>,
    /// Unmodeled keys
    #[serde(flatten)]
    pub extra: Extra,
}

impl LedgerEntry for WorkerEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Option<Address> {
        Some(self.address)
    }
}

/// A family of strategy contracts shared by the workers of one exchange
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyGroupEntry {
    /// The group's name, e.g. the exchange the strategies trade on
    pub name: String,
    /// The block the group was deployed in
    #[serde(default)]
    pub deployed_block: u64,
    /// Strategy addresses keyed by strategy kind
    #[serde(default)]
    pub strategies: BTreeMap<String, Address>,
    /// Unmodeled keys
    #[serde(flatten)]
    pub extra: Extra,
}

impl LedgerEntry for StrategyGroupEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A delta-neutral vault pairing a stable-side and an asset-side position
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaVaultEntry {
    /// The vault's name
    pub name: String,
    /// The vault's share token symbol
    pub symbol: String,
    /// The vault proxy's address
    pub address: Address,
    /// The block the vault was deployed in
    pub deployed_block: u64,
    /// The stable token
    pub stable_token: Address,
    /// The asset token
    pub asset_token: Address,
    /// The lending vault of the stable token
    pub stable_vault: Address,
    /// The lending vault of the asset token
    pub asset_vault: Address,
    /// The worker holding the stable-side position
    pub stable_delta_worker: Address,
    /// The worker holding the asset-side position
    pub asset_delta_worker: Address,
    /// The price oracle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle: Option<Address>,
    /// The vault's config contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Address>,
    /// Unmodeled keys
    #[serde(flatten)]
    pub extra: Extra,
}

impl LedgerEntry for DeltaVaultEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> Option<&str> {
        Some(&self.symbol)
    }

    fn address(&self) -> Option<Address> {
        Some(self.address)
    }
}
