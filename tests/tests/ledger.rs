use alloy::primitives::{address, Address};
use eyre::Result;
use orchestrator::{
    errors::LedgerError,
    ledger::{TokenEntry, VaultEntry, WorkerEntry},
    Ledger,
};
use tests::utils::{setup_ledger, MULTICALL, TIMELOCK};

const WBNB: Address = address!("0x00000000000000000000000000000000000000b1");
const IB_BNB: Address = address!("0x00000000000000000000000000000000000000a1");
const WORKER: Address = address!("0x00000000000000000000000000000000000000c1");
const LP: Address = address!("0x00000000000000000000000000000000000000d1");

fn wbnb() -> TokenEntry {
    TokenEntry {
        name: "Wrapped BNB".to_string(),
        symbol: "WBNB".to_string(),
        address: WBNB,
        deployed_block: 0,
        decimals: Some(18),
        extra: Default::default(),
    }
}

fn ib_bnb() -> VaultEntry {
    VaultEntry {
        name: "Interest Bearing BNB".to_string(),
        symbol: "ibBNB".to_string(),
        address: IB_BNB,
        deployed_block: 6_000_000,
        base_token: WBNB,
        debt_token: None,
        config: None,
        triple_slope_model: None,
        workers: vec![],
        extra: Default::default(),
    }
}

fn worker(p_id: u64) -> WorkerEntry {
    WorkerEntry {
        name: "WBNB CakeMaxiWorker".to_string(),
        address: WORKER,
        deployed_block: 6_000_100,
        config: None,
        p_id,
        staking_token: LP,
        staking_token_at: None,
        strategies: vec![],
        extra: Default::default(),
    }
}

#[test]
fn test_worker_survives_reload() -> Result<()> {
    let (_dir, mut ledger) = setup_ledger()?;
    ledger.add_or_set_token("WBNB", wbnb())?;
    ledger.add_or_set_vault("ibBNB", ib_bnb())?;
    ledger.add_or_set_worker("ibBNB", "WBNB CakeMaxiWorker", worker(5))?;

    let reloaded = Ledger::open(ledger.path())?;
    let workers = reloaded.entries::<WorkerEntry>("ibBNB")?;
    assert_eq!(workers.len(), 1);
    assert_eq!(workers[0].p_id, 5);
    assert_eq!(workers[0].address, WORKER);
    assert_eq!(workers[0].staking_token, LP);

    assert_eq!(reloaded.governance()?, TIMELOCK);
    assert_eq!(reloaded.multicall()?, MULTICALL);

    Ok(())
}

#[test]
fn test_file_layout() -> Result<()> {
    let (_dir, mut ledger) = setup_ledger()?;
    ledger.add_or_set_vault("ibBNB", ib_bnb())?;
    ledger.add_or_set_worker("ibBNB", "WBNB CakeMaxiWorker", worker(5))?;

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(ledger.path())?)?;
    let worker = &raw["Vaults"][0]["workers"][0];
    assert_eq!(worker["pId"], serde_json::json!(5));
    assert!(worker["stakingToken"].is_string());
    assert!(raw["Timelock"].is_string());
    assert!(raw["Tokens"].as_array().unwrap().is_empty());

    Ok(())
}

#[test]
fn test_lookup_precedence_and_case() -> Result<()> {
    let (_dir, mut ledger) = setup_ledger()?;
    ledger.add_or_set_vault("ibBNB", ib_bnb())?;
    ledger.add_or_set_worker("ibBNB", "WBNB CakeMaxiWorker", worker(5))?;

    // Found through any of its keys, whatever the address casing
    let lower = format!("{:#x}", WORKER);
    let upper = format!("0x{}", lower[2..].to_uppercase());
    for key in ["WBNB CakeMaxiWorker", lower.as_str(), upper.as_str()] {
        assert_eq!(ledger.find::<WorkerEntry>("ibBNB", key)?.p_id, 5);
    }

    // Re-recording through the address replaces rather than appends
    ledger.add_or_set_worker("ibBNB", &upper, worker(6))?;
    let workers = ledger.entries::<WorkerEntry>("ibBNB")?;
    assert_eq!(workers.len(), 1);
    assert_eq!(workers[0].p_id, 6);

    Ok(())
}

#[test]
fn test_worker_of_unknown_vault() -> Result<()> {
    let (_dir, mut ledger) = setup_ledger()?;
    let before = std::fs::read_to_string(ledger.path())?;

    let err = ledger
        .add_or_set_worker("ibBUSD", "WBNB CakeMaxiWorker", worker(5))
        .unwrap_err();
    assert!(matches!(err, LedgerError::ParentNotFound { .. }));
    assert_eq!(std::fs::read_to_string(ledger.path())?, before);

    Ok(())
}
