//! Sequence numbers for the transactions sent by one signer during one run

use crate::{chain::ChainClient, errors::ChainError};

/// Hands out consecutive nonces for a single signer.
///
/// Nonces are allocated locally rather than re-read from the node before every transaction,
/// so transactions sent back to back never collide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonceAllocator {
    /// The nonce the next transaction will be sent with
    next: u64,
}

impl NonceAllocator {
    /// Start allocating at an explicit nonce
    pub fn starting_at(nonce: u64) -> Self {
        Self { next: nonce }
    }

    /// Start allocating at the signer's current on-chain transaction count
    pub async fn for_signer<C: ChainClient>(client: &C) -> Result<Self, ChainError> {
        client
            .transaction_count(client.signer())
            .await
            .map(Self::starting_at)
    }

    /// Allocate the next nonce
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.next;
        self.next += 1;
        nonce
    }

    /// The nonce that will be allocated next, without allocating it
    pub fn peek(&self) -> u64 {
        self.next
    }
}
