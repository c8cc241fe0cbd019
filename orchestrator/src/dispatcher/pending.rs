//! Transactions queued for the timelock, and the per-run file they are recorded in

use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use alloy::primitives::{Address, Bytes, U256};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{constants::JSON_EXTENSION, dispatcher::encoding::slugify, errors::DispatchError};

/// A state-changing call recorded for later submission to the timelock.
///
/// Never mutated once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    /// What the transaction does
    pub description: String,
    /// The contract the timelock will call
    pub target: Address,
    /// The native value the timelock will attach
    pub value: U256,
    /// The normalized function signature
    pub signature: String,
    /// The declared ABI types of the parameters
    pub param_types: Vec<String>,
    /// The parameters, rendered for reading
    pub param_values: Vec<serde_json::Value>,
    /// The earliest time, in unix seconds, the transaction may execute
    pub eta: u64,
    /// The ABI-encoded parameters handed to the timelock
    pub data: Bytes,
}

/// The pending transactions of one run, in the order they were queued
#[derive(Clone, Debug)]
pub struct PendingBatch {
    /// Human-readable title of the run
    title: String,
    /// When the run started
    started_at: Timestamp,
    /// The queued transactions
    transactions: Vec<PendingTransaction>,
}

impl PendingBatch {
    /// Start a batch for a run beginning now
    pub fn new(title: &str) -> Self {
        Self::started_at(title, Timestamp::now())
    }

    /// Start a batch for a run that began at `started_at`
    pub fn started_at(title: &str, started_at: Timestamp) -> Self {
        Self {
            title: title.to_string(),
            started_at,
            transactions: Vec::new(),
        }
    }

    /// Append a queued transaction
    pub fn push(&mut self, tx: PendingTransaction) {
        self.transactions.push(tx);
    }

    /// The queued transactions
    pub fn transactions(&self) -> &[PendingTransaction] {
        &self.transactions
    }

    /// The number of queued transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether nothing has been queued
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The name of the file this batch is written to: `<unix seconds>_<title slug>.json`
    pub fn file_name(&self) -> String {
        self.file_name_with_suffix(0)
    }

    /// The file name with a numeric suffix, `<unix seconds>_<title slug>_<n>.json`, used when
    /// another run of the same second already claimed the plain name
    fn file_name_with_suffix(&self, n: u32) -> String {
        let stem = format!("{}_{}", self.started_at.as_second(), slugify(&self.title));
        if n == 0 {
            format!("{}.{}", stem, JSON_EXTENSION)
        } else {
            format!("{}_{}.{}", stem, n, JSON_EXTENSION)
        }
    }

    /// Write the batch as a JSON array into `dir`, returning the path written.
    ///
    /// Nothing is written for an empty batch. An existing file is never overwritten; the
    /// first free suffixed name is used instead.
    pub fn write_to(&self, dir: &Path) -> Result<Option<PathBuf>, DispatchError> {
        if self.is_empty() {
            info!("No transactions queued for the timelock");
            return Ok(None);
        }

        fs::create_dir_all(dir).map_err(|e| DispatchError::Artifact(e.to_string()))?;
        let contents = serde_json::to_string_pretty(&self.transactions)
            .map_err(|e| DispatchError::Artifact(e.to_string()))?;

        let mut n = 0;
        let (path, mut file) = loop {
            let path = dir.join(self.file_name_with_suffix(n));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => {
                    return Err(DispatchError::Artifact(format!("{}: {}", path.display(), e)))
                },
            }
        };
        file.write_all(contents.as_bytes())
            .map_err(|e| DispatchError::Artifact(format!("{}: {}", path.display(), e)))?;

        info!(
            "Wrote {} pending transaction(s) to {}",
            self.len(),
            path.display()
        );
        Ok(Some(path))
    }

    /// Read the transactions of a previously written batch
    pub fn read(path: &Path) -> Result<Vec<PendingTransaction>, DispatchError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| DispatchError::Artifact(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| DispatchError::Artifact(format!("{}: {}", path.display(), e)))
    }
}
