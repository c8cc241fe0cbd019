//! Fixtures shared by the integration tests

use alloy::primitives::{address, Address};
use orchestrator::{
    dispatcher::NonceAllocator, ledger::Singleton, Dispatcher, Ledger, PendingBatch,
};
use tempfile::TempDir;

use crate::mock::MockChainClient;

/// The deployer
pub const SIGNER: Address = address!("0x00000000000000000000000000000000000000e0");
/// The timelock
pub const TIMELOCK: Address = address!("0x00000000000000000000000000000000000000f1");
/// The multicall contract
pub const MULTICALL: Address = address!("0x00000000000000000000000000000000000000f2");
/// A contract owned by the timelock
pub const GOVERNED: Address = address!("0x00000000000000000000000000000000000000a1");
/// A contract owned by the deployer
pub const UNGOVERNED: Address = address!("0x00000000000000000000000000000000000000a2");

/// The signer's transaction count at the start of every test
pub const STARTING_NONCE: u64 = 7;

/// A mock client where [`GOVERNED`] is owned by the timelock and [`UNGOVERNED`] by the signer
pub fn setup_client() -> MockChainClient {
    MockChainClient::new(SIGNER, STARTING_NONCE)
        .with_owner(GOVERNED, TIMELOCK)
        .with_owner(UNGOVERNED, SIGNER)
}

/// A dispatcher over `client` with an empty pending batch titled `title`
pub async fn setup_dispatcher<'a>(
    client: &'a MockChainClient,
    title: &str,
) -> eyre::Result<Dispatcher<'a, MockChainClient>> {
    let nonces = NonceAllocator::for_signer(client).await?;
    Ok(Dispatcher::new(client, TIMELOCK, nonces, PendingBatch::new(title)))
}

/// A ledger in a fresh temporary directory, with the singletons recorded
pub fn setup_ledger() -> eyre::Result<(TempDir, Ledger)> {
    let dir = tempfile::tempdir()?;
    let mut ledger = Ledger::open(Ledger::path_for(dir.path(), "testnet"))?;
    ledger.set_singleton(Singleton::Timelock, TIMELOCK)?;
    ledger.set_singleton(Singleton::Multicall, MULTICALL)?;
    Ok((dir, ledger))
}
