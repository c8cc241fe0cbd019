use alloy::{
    dyn_abi::DynSolValue,
    primitives::{keccak256, Selector, U256},
};
use eyre::Result;
use orchestrator::{
    errors::GovernanceError,
    governance::{execute_calldata, queue_calldata, Timelock, TimelockAction},
    DispatchOutcome, DispatchRequest, NonceAllocator, PendingTransaction,
};
use tests::{
    mock::encode_return,
    utils::{setup_client, setup_dispatcher, GOVERNED, STARTING_NONCE, TIMELOCK},
};

const NOW: u64 = 1_700_000_000;
const DELAY: u64 = 86_400;

/// Queue two calls for the timelock through the dispatcher
async fn queued_batch(eta: u64) -> Result<Vec<PendingTransaction>> {
    let client = setup_client();
    let mut dispatcher = setup_dispatcher(&client, "Enable strategies").await?;

    let mut txs = vec![];
    for ok in [true, false] {
        let outcome = dispatcher
            .dispatch(DispatchRequest {
                target: GOVERNED,
                owner: TIMELOCK,
                signature: "setStrategyOk(address[],bool)".to_string(),
                param_types: vec!["address[]".to_string(), "bool".to_string()],
                param_values: vec![
                    DynSolValue::Array(vec![DynSolValue::Address(GOVERNED)]),
                    DynSolValue::Bool(ok),
                ],
                description: format!("setStrategyOk {}", ok),
                value: U256::ZERO,
                eta,
            })
            .await?;
        if let DispatchOutcome::Queued(tx) = outcome {
            txs.push(tx);
        }
    }

    assert_eq!(txs.len(), 2);
    Ok(txs)
}

#[tokio::test]
async fn test_queue_batch() -> Result<()> {
    let txs = queued_batch(NOW + DELAY).await?;
    let client = setup_client();
    let timelock = Timelock::new(&client, TIMELOCK);
    let mut nonces = NonceAllocator::starting_at(STARTING_NONCE);

    let receipts = timelock
        .submit_batch(TimelockAction::Queue, &txs, &mut nonces, NOW)
        .await?;
    assert_eq!(receipts.len(), 2);

    let sent = client.sent();
    assert_eq!(sent.len(), 2);
    for (tx, pending) in sent.iter().zip(txs.iter()) {
        assert_eq!(tx.target, TIMELOCK);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.data, queue_calldata(pending));
    }
    assert_eq!(sent[0].nonce, STARTING_NONCE);
    assert_eq!(sent[1].nonce, STARTING_NONCE + 1);

    Ok(())
}

#[tokio::test]
async fn test_execute_batch() -> Result<()> {
    let txs = queued_batch(NOW + DELAY).await?;
    let client = setup_client();
    let timelock = Timelock::new(&client, TIMELOCK);
    let mut nonces = NonceAllocator::starting_at(STARTING_NONCE);

    timelock
        .submit_batch(TimelockAction::Execute, &txs, &mut nonces, NOW + DELAY)
        .await?;

    let sent = client.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].data, execute_calldata(&txs[1]));

    Ok(())
}

#[tokio::test]
async fn test_execute_before_eta_sends_nothing() -> Result<()> {
    let txs = queued_batch(NOW + DELAY).await?;
    let client = setup_client();
    let timelock = Timelock::new(&client, TIMELOCK);
    let mut nonces = NonceAllocator::starting_at(STARTING_NONCE);

    let err = timelock
        .submit_batch(TimelockAction::Execute, &txs, &mut nonces, NOW)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GovernanceError::EtaNotReached {
            description: txs[0].description.clone(),
            eta: NOW + DELAY,
            now: NOW,
        }
    );
    assert!(client.sent().is_empty());
    assert_eq!(nonces.peek(), STARTING_NONCE);

    Ok(())
}

#[tokio::test]
async fn test_delay_and_eta_checks() -> Result<()> {
    let delay_selector = Selector::from_slice(&keccak256("delay()")[..4]);
    let client = setup_client().with_response(
        TIMELOCK,
        delay_selector,
        encode_return(vec![DynSolValue::Uint(U256::from(DELAY), 256)]),
    );
    let timelock = Timelock::new(&client, TIMELOCK);

    let delay = timelock.delay().await?;
    assert_eq!(delay, DELAY);

    let mut txs = queued_batch(NOW + DELAY).await?;
    assert_eq!(timelock.check_etas(&txs, NOW, delay), 0);

    txs[1].eta = NOW + DELAY - 1;
    assert_eq!(timelock.check_etas(&txs, NOW, delay), 1);

    Ok(())
}
