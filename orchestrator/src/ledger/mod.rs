//! The deployments ledger: one JSON document per network recording what is deployed where.
//!
//! Every mutation rewrites the whole document on disk before returning, so the file always
//! reflects the latest recorded state.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    constants::{
        DELTA_VAULTS_KEY, JSON_EXTENSION, MULTICALL_KEY, PROXY_ADMIN_KEY, SHARED_STRATEGIES_KEY,
        TEMP_EXTENSION, TIMELOCK_KEY, TOKENS_KEY, VAULTS_KEY, WORKERS_KEY,
    },
    errors::LedgerError,
};

pub mod entries;
pub mod matching;

pub use entries::{
    DeltaVaultEntry, Extra, LedgerEntry, StrategyGroupEntry, TokenEntry, VaultEntry, WorkerEntry,
};
pub use matching::{addresses_equal, position, MatchStrategy, LOOKUP_ORDER};

/// The ledger document of one network
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    /// The proxy admin of every upgradeable contract
    #[serde(rename = "ProxyAdmin", default, skip_serializing_if = "Option::is_none")]
    pub proxy_admin: Option<Address>,
    /// The timelock governing the protocol
    #[serde(rename = "Timelock", default, skip_serializing_if = "Option::is_none")]
    pub timelock: Option<Address>,
    /// The multicall contract used for aggregate reads
    #[serde(rename = "Multicall", default, skip_serializing_if = "Option::is_none")]
    pub multicall: Option<Address>,
    /// Tokens
    #[serde(rename = "Tokens", default)]
    pub tokens: Vec<TokenEntry>,
    /// Lending vaults and their workers
    #[serde(rename = "Vaults", default)]
    pub vaults: Vec<VaultEntry>,
    /// Delta-neutral vaults
    #[serde(rename = "DeltaNeutralVaults", default)]
    pub delta_vaults: Vec<DeltaVaultEntry>,
    /// Strategy groups shared between workers
    #[serde(rename = "SharedStrategies", default)]
    pub shared_strategies: Vec<StrategyGroupEntry>,
    /// Unmodeled top-level keys
    #[serde(flatten)]
    pub extra: Extra,
}

/// A protocol-wide address recorded once per network
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Singleton {
    /// The proxy admin
    ProxyAdmin,
    /// The timelock
    Timelock,
    /// The multicall contract
    Multicall,
}

impl Singleton {
    /// The singleton's key in the ledger file
    pub fn key(&self) -> &'static str {
        match self {
            Singleton::ProxyAdmin => PROXY_ADMIN_KEY,
            Singleton::Timelock => TIMELOCK_KEY,
            Singleton::Multicall => MULTICALL_KEY,
        }
    }

    /// The singleton's slot in the document
    fn slot(self, doc: &mut LedgerDocument) -> &mut Option<Address> {
        match self {
            Singleton::ProxyAdmin => &mut doc.proxy_admin,
            Singleton::Timelock => &mut doc.timelock,
            Singleton::Multicall => &mut doc.multicall,
        }
    }
}

/// An entry kind together with the collection it lives in
pub trait Collected: LedgerEntry + Sized {
    /// What locates the collection within the document: `()` for top-level collections, the
    /// parent's lookup key for nested ones
    type Scope: ?Sized;

    /// The collection's key in the ledger file
    const COLLECTION: &'static str;

    /// The collection
    fn entries<'a>(doc: &'a LedgerDocument, scope: &Self::Scope)
        -> Result<&'a [Self], LedgerError>;

    /// The collection, mutably
    fn entries_mut<'a>(
        doc: &'a mut LedgerDocument,
        scope: &Self::Scope,
    ) -> Result<&'a mut Vec<Self>, LedgerError>;
}

/// Implement [`Collected`] for an entry kind held in a top-level collection
macro_rules! top_level_collection {
    ($entry:ty, $field:ident, $key:expr) => {
        impl Collected for $entry {
            type Scope = ();
            const COLLECTION: &'static str = $key;

            fn entries<'a>(doc: &'a LedgerDocument, _: &()) -> Result<&'a [Self], LedgerError> {
                Ok(&doc.$field)
            }

            fn entries_mut<'a>(
                doc: &'a mut LedgerDocument,
                _: &(),
            ) -> Result<&'a mut Vec<Self>, LedgerError> {
                Ok(&mut doc.$field)
            }
        }
    };
}

top_level_collection!(TokenEntry, tokens, TOKENS_KEY);
top_level_collection!(VaultEntry, vaults, VAULTS_KEY);
top_level_collection!(DeltaVaultEntry, delta_vaults, DELTA_VAULTS_KEY);
top_level_collection!(StrategyGroupEntry, shared_strategies, SHARED_STRATEGIES_KEY);

impl Collected for WorkerEntry {
    type Scope = str;
    const COLLECTION: &'static str = WORKERS_KEY;

    fn entries<'a>(doc: &'a LedgerDocument, vault: &str) -> Result<&'a [Self], LedgerError> {
        let index = parent_position(&doc.vaults, vault)?;
        Ok(&doc.vaults[index].workers)
    }

    fn entries_mut<'a>(
        doc: &'a mut LedgerDocument,
        vault: &str,
    ) -> Result<&'a mut Vec<Self>, LedgerError> {
        let index = parent_position(&doc.vaults, vault)?;
        Ok(&mut doc.vaults[index].workers)
    }
}

/// The position of the vault a nested collection belongs to
fn parent_position(vaults: &[VaultEntry], key: &str) -> Result<usize, LedgerError> {
    position(vaults, key).ok_or_else(|| LedgerError::ParentNotFound {
        collection: VAULTS_KEY,
        key: key.to_string(),
    })
}

/// The ledger of one network, bound to its file
#[derive(Debug)]
pub struct Ledger {
    /// The file the ledger is flushed to
    path: PathBuf,
    /// The in-memory document
    document: LedgerDocument,
}

impl Ledger {
    /// The ledger file of `network` within `dir`
    pub fn path_for(dir: &Path, network: &str) -> PathBuf {
        dir.join(format!("{}.{}", network, JSON_EXTENSION))
    }

    /// Load the ledger at `path`, starting from an empty document if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        if !path.exists() {
            warn!(
                "No ledger at {}, starting from an empty document",
                path.display()
            );
            return Ok(Self {
                path,
                document: LedgerDocument::default(),
            });
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| LedgerError::Read(format!("{}: {}", path.display(), e)))?;
        let document = serde_json::from_str(&contents)
            .map_err(|e| LedgerError::Parse(format!("{}: {}", path.display(), e)))?;

        Ok(Self { path, document })
    }

    /// The file the ledger is flushed to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory document
    pub fn document(&self) -> &LedgerDocument {
        &self.document
    }

    // --- Lookups --- //

    /// The entries of a collection
    pub fn entries<E: Collected>(&self, scope: &E::Scope) -> Result<&[E], LedgerError> {
        E::entries(&self.document, scope)
    }

    /// Find an entry by name, then symbol, then address
    pub fn find<E: Collected>(&self, scope: &E::Scope, key: &str) -> Result<&E, LedgerError> {
        let entries = E::entries(&self.document, scope)?;
        position(entries, key)
            .map(|index| &entries[index])
            .ok_or_else(|| LedgerError::EntryNotFound {
                collection: E::COLLECTION,
                key: key.to_string(),
            })
    }

    /// Resolve a key to an address: either the key itself, if it is an address, or the
    /// address of the first entry it identifies among tokens, vaults, delta-neutral vaults,
    /// and workers
    pub fn resolve_address(&self, key: &str) -> Result<Address, LedgerError> {
        if let Ok(address) = Address::from_str(key) {
            return Ok(address);
        }

        let doc = &self.document;
        let found = position(&doc.tokens, key)
            .map(|i| doc.tokens[i].address)
            .or_else(|| position(&doc.vaults, key).map(|i| doc.vaults[i].address))
            .or_else(|| position(&doc.delta_vaults, key).map(|i| doc.delta_vaults[i].address))
            .or_else(|| {
                doc.vaults.iter().find_map(|vault| {
                    position(&vault.workers, key).map(|i| vault.workers[i].address)
                })
            });

        found.ok_or_else(|| LedgerError::EntryNotFound {
            collection: "ledger",
            key: key.to_string(),
        })
    }

    /// A recorded singleton address
    pub fn singleton(&self, singleton: Singleton) -> Result<Address, LedgerError> {
        let doc = &self.document;
        match singleton {
            Singleton::ProxyAdmin => doc.proxy_admin,
            Singleton::Timelock => doc.timelock,
            Singleton::Multicall => doc.multicall,
        }
        .ok_or(LedgerError::MissingSingleton(singleton.key()))
    }

    /// The timelock address
    pub fn governance(&self) -> Result<Address, LedgerError> {
        self.singleton(Singleton::Timelock)
    }

    /// The multicall address
    pub fn multicall(&self) -> Result<Address, LedgerError> {
        self.singleton(Singleton::Multicall)
    }

    /// The proxy admin address
    pub fn proxy_admin(&self) -> Result<Address, LedgerError> {
        self.singleton(Singleton::ProxyAdmin)
    }

    // --- Mutations --- //

    /// Replace the entry identified by `key` in place, or append `entry` if none matches, then
    /// flush the document
    pub fn upsert<E: Collected>(
        &mut self,
        scope: &E::Scope,
        key: &str,
        entry: E,
    ) -> Result<&LedgerDocument, LedgerError> {
        let entries = E::entries_mut(&mut self.document, scope)?;
        match position(entries, key) {
            Some(index) => {
                debug!("Replacing `{}` in {}", key, E::COLLECTION);
                entries[index] = entry;
            }
            None => {
                debug!("Appending `{}` to {}", key, E::COLLECTION);
                entries.push(entry);
            }
        }

        self.flush()?;
        Ok(&self.document)
    }

    /// Record a token
    pub fn add_or_set_token(
        &mut self,
        key: &str,
        entry: TokenEntry,
    ) -> Result<&LedgerDocument, LedgerError> {
        self.upsert(&(), key, entry)
    }

    /// Record a vault
    pub fn add_or_set_vault(
        &mut self,
        key: &str,
        entry: VaultEntry,
    ) -> Result<&LedgerDocument, LedgerError> {
        self.upsert(&(), key, entry)
    }

    /// Record a worker of the vault identified by `vault`, which must already be recorded
    pub fn add_or_set_worker(
        &mut self,
        vault: &str,
        key: &str,
        entry: WorkerEntry,
    ) -> Result<&LedgerDocument, LedgerError> {
        self.upsert(vault, key, entry)
    }

    /// Record a delta-neutral vault
    pub fn add_or_set_delta_vault(
        &mut self,
        key: &str,
        entry: DeltaVaultEntry,
    ) -> Result<&LedgerDocument, LedgerError> {
        self.upsert(&(), key, entry)
    }

    /// Record a strategy group
    pub fn add_or_set_strategy_group(
        &mut self,
        key: &str,
        entry: StrategyGroupEntry,
    ) -> Result<&LedgerDocument, LedgerError> {
        self.upsert(&(), key, entry)
    }

    /// Record a singleton address
    pub fn set_singleton(
        &mut self,
        singleton: Singleton,
        address: Address,
    ) -> Result<&LedgerDocument, LedgerError> {
        *singleton.slot(&mut self.document) = Some(address);
        self.flush()?;
        Ok(&self.document)
    }

    /// Write the whole document to a scratch file and move it over the ledger file
    fn flush(&self) -> Result<(), LedgerError> {
        let contents = serde_json::to_string_pretty(&self.document)
            .map_err(|e| LedgerError::Write(e.to_string()))?;

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| LedgerError::Write(e.to_string()))?;
        }

        let scratch = self.path.with_extension(TEMP_EXTENSION);
        fs::write(&scratch, contents)
            .map_err(|e| LedgerError::Write(format!("{}: {}", scratch.display(), e)))?;
        fs::rename(&scratch, &self.path)
            .map_err(|e| LedgerError::Write(format!("{}: {}", self.path.display(), e)))?;

        debug!("Flushed ledger to {}", self.path.display());
        Ok(())
    }
}
