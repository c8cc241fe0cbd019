use alloy::primitives::{address, keccak256, Address, U256};
use eyre::Result;
use orchestrator::{
    dispatcher::encoding::coerce_param,
    errors::{ChainError, DispatchError},
    governance::now_seconds,
    DispatchOutcome, DispatchRequest, PendingBatch,
};
use serde_json::json;
use tests::{
    mock::REVERT_REASON,
    utils::{
        setup_client, setup_dispatcher, GOVERNED, SIGNER, STARTING_NONCE, TIMELOCK, UNGOVERNED,
    },
};

const WORKER_A: Address = address!("0x00000000000000000000000000000000000000c1");
const WORKER_B: Address = address!("0x00000000000000000000000000000000000000c2");

const SET_CONFIGS: &str = "setConfigs(address[],(bool,bool,uint64,uint64,uint64)[])";

fn set_configs(target: Address, owner: Address, eta: u64) -> Result<DispatchRequest> {
    let param_types = vec![
        "address[]".to_string(),
        "(bool,bool,uint64,uint64,uint64)[]".to_string(),
    ];
    let param_values = vec![
        coerce_param(&param_types[0], &format!("[{:#x},{:#x}]", WORKER_A, WORKER_B))?,
        coerce_param(
            &param_types[1],
            "[(true,true,7000,8500,10000),(true,false,6000,7500,10000)]",
        )?,
    ];

    Ok(DispatchRequest {
        target,
        owner,
        signature: SET_CONFIGS.to_string(),
        param_types,
        param_values,
        description: "Update worker configs".to_string(),
        value: U256::ZERO,
        eta,
    })
}

#[tokio::test]
async fn test_governed_target_is_queued() -> Result<()> {
    let client = setup_client();
    let mut dispatcher = setup_dispatcher(&client, "Update worker configs").await?;
    let eta = now_seconds() + 86_400;

    let owner = dispatcher.current_owner(GOVERNED).await?;
    assert_eq!(owner, TIMELOCK);

    let outcome = dispatcher.dispatch(set_configs(GOVERNED, owner, eta)?).await?;
    let DispatchOutcome::Queued(pending) = outcome else {
        panic!("expected the call to be queued, got {:?}", outcome);
    };
    assert_eq!(pending.signature, SET_CONFIGS);
    assert_eq!(pending.eta, eta);
    assert_eq!(pending.target, GOVERNED);

    // Nothing was sent and no nonce was consumed
    assert!(client.sent().is_empty());
    assert_eq!(dispatcher.nonces_mut().peek(), STARTING_NONCE);

    // The artifact holds exactly the queued call
    let dir = tempfile::tempdir()?;
    let path = dispatcher.flush_pending(dir.path())?.unwrap();
    let artifact: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    let records = artifact.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["signature"], json!(SET_CONFIGS));
    assert_eq!(records[0]["eta"], json!(eta));
    assert_eq!(
        records[0]["paramValues"][0],
        json!([WORKER_A.to_checksum(None), WORKER_B.to_checksum(None)])
    );
    assert_eq!(records[0]["paramValues"][1][0], json!([true, true, "7000", "8500", "10000"]));

    let read_back = PendingBatch::read(&path)?;
    assert_eq!(read_back, vec![pending]);

    Ok(())
}

#[tokio::test]
async fn test_ungoverned_target_is_sent() -> Result<()> {
    let client = setup_client();
    let mut dispatcher = setup_dispatcher(&client, "Update worker configs").await?;

    let owner = dispatcher.current_owner(UNGOVERNED).await?;
    let first = dispatcher.dispatch(set_configs(UNGOVERNED, owner, 0)?).await?;
    let second = dispatcher.dispatch(set_configs(UNGOVERNED, owner, 0)?).await?;

    let (DispatchOutcome::Executed(first), DispatchOutcome::Executed(second)) = (first, second)
    else {
        panic!("expected both calls to be executed");
    };
    assert_eq!(first.nonce, STARTING_NONCE);
    assert_eq!(second.nonce, STARTING_NONCE + 1);

    let sent = client.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].target, UNGOVERNED);
    assert_eq!(&sent[0].data[..4], &keccak256(SET_CONFIGS)[..4]);
    assert!(dispatcher.pending().is_empty());

    // An empty batch writes no artifact
    let dir = tempfile::tempdir()?;
    assert_eq!(dispatcher.flush_pending(dir.path())?, None);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_mixed_run_keeps_nonces_consecutive() -> Result<()> {
    let client = setup_client();
    let mut dispatcher = setup_dispatcher(&client, "Mixed").await?;

    dispatcher.dispatch(set_configs(UNGOVERNED, UNGOVERNED, 0)?).await?;
    dispatcher.dispatch(set_configs(GOVERNED, TIMELOCK, 1_800_000_000)?).await?;
    dispatcher.dispatch(set_configs(UNGOVERNED, UNGOVERNED, 0)?).await?;

    let nonces: Vec<u64> = client.sent().iter().map(|tx| tx.nonce).collect();
    assert_eq!(nonces, vec![STARTING_NONCE, STARTING_NONCE + 1]);
    assert_eq!(dispatcher.pending().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_revert_reason_propagates() -> Result<()> {
    let client = setup_client().with_reverting(UNGOVERNED);
    let mut dispatcher = setup_dispatcher(&client, "Reverting").await?;

    let err = dispatcher
        .dispatch(set_configs(UNGOVERNED, SIGNER, 0)?)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::Execution(ChainError::Reverted(REVERT_REASON.to_string()))
    );
    assert!(dispatcher.pending().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_malformed_call_sends_nothing() -> Result<()> {
    let client = setup_client();
    let mut dispatcher = setup_dispatcher(&client, "Malformed").await?;

    let mut request = set_configs(UNGOVERNED, UNGOVERNED, 0)?;
    request.signature = "setConfigs(address[],bool)".to_string();
    let err = dispatcher.dispatch(request).await.unwrap_err();
    assert!(matches!(err, DispatchError::Params(_)));

    let mut request = set_configs(GOVERNED, TIMELOCK, 0)?;
    request.param_values.pop();
    let err = dispatcher.dispatch(request).await.unwrap_err();
    assert!(matches!(err, DispatchError::Params(_)));

    assert!(client.sent().is_empty());
    assert!(dispatcher.pending().is_empty());

    Ok(())
}
