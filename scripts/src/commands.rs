//! Implementations of the various deploy scripts

use alloy::{dyn_abi::DynSolValue, rpc::types::BlockId};
use itertools::Itertools;
use orchestrator::{
    dispatcher::encoding::coerce_param,
    governance::{now_seconds, Timelock, TimelockAction},
    ledger::{
        DeltaVaultEntry, Ledger, Singleton, StrategyGroupEntry, TokenEntry, VaultEntry,
        WorkerEntry,
    },
    CallAggregator, DispatchOutcome, DispatchRequest, Dispatcher, NonceAllocator, PendingBatch,
    RpcChainClient,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    cli::{
        BatchArgs, DispatchArgs, LookupArgs, OwnersArgs, RecordSingletonArgs, RecordTokenArgs,
        RecordVaultArgs, RecordWorkerArgs, SetWorkerStrategiesArgs,
    },
    constants::{SET_STRATEGY_OK_PARAM_TYPES, SET_STRATEGY_OK_SIGNATURE},
    errors::ScriptError,
    utils::{
        parse_address, parse_optional_address, parse_value, resolve_eta, resolve_strategy,
        setup_client, RunContext,
    },
};

// --- Reads --- //

/// Read the owners of several contracts in one batch
pub async fn owners(args: OwnersArgs, ctx: &RunContext) -> Result<(), ScriptError> {
    let ledger = ctx.open_ledger()?;
    let targets = args
        .keys
        .iter()
        .map(|key| ledger.resolve_address(key))
        .collect::<Result<Vec<_>, _>>()?;
    let governance = ledger.governance().ok();

    let client = setup_client(ctx, ledger.multicall()?)?;
    let at_block = args.block.map(BlockId::number);

    info!("Reading the owners of {}", args.keys.iter().join(", "));
    let owners = CallAggregator::new(&client).owners(&targets, at_block).await?;

    for ((key, target), owner) in args.keys.iter().zip(targets).zip(owners) {
        let governed = if Some(owner) == governance {
            " (timelock)"
        } else {
            ""
        };
        info!("{} at {:#x} is owned by {:#x}{}", key, target, owner, governed);
    }

    Ok(())
}

/// Print the ledger entry identified by a key
pub fn lookup(args: LookupArgs, ctx: &RunContext) -> Result<(), ScriptError> {
    let ledger = ctx.open_ledger()?;

    let entry = match &args.vault {
        Some(vault) => to_json(ledger.find::<WorkerEntry>(vault, &args.key)?)?,
        None => find_top_level(&ledger, &args.key)?,
    };

    let rendered =
        serde_json::to_string_pretty(&entry).map_err(|e| ScriptError::Serde(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}

/// Find a key among the top-level collections, in the order they appear in the ledger file
fn find_top_level(ledger: &Ledger, key: &str) -> Result<Value, ScriptError> {
    if let Ok(entry) = ledger.find::<TokenEntry>(&(), key) {
        return to_json(entry);
    }
    if let Ok(entry) = ledger.find::<VaultEntry>(&(), key) {
        return to_json(entry);
    }
    if let Ok(entry) = ledger.find::<DeltaVaultEntry>(&(), key) {
        return to_json(entry);
    }
    to_json(ledger.find::<StrategyGroupEntry>(&(), key)?)
}

/// Serialize a ledger entry for output
fn to_json<T: serde::Serialize>(entry: &T) -> Result<Value, ScriptError> {
    serde_json::to_value(entry).map_err(|e| ScriptError::Serde(e.to_string()))
}

// --- Dispatch --- //

/// Set up a dispatcher for the signer, with a pending batch titled `title`
async fn setup_dispatcher<'a>(
    client: &'a RpcChainClient,
    ledger: &Ledger,
    title: &str,
) -> Result<Dispatcher<'a, RpcChainClient>, ScriptError> {
    let nonces = NonceAllocator::for_signer(client).await?;
    Ok(Dispatcher::new(
        client,
        ledger.governance()?,
        nonces,
        PendingBatch::new(title),
    ))
}

/// Dispatch a request, then write whatever was queued for the timelock, even on failure
async fn dispatch_and_flush(
    dispatcher: &mut Dispatcher<'_, RpcChainClient>,
    request: DispatchRequest,
    ctx: &RunContext,
) -> Result<DispatchOutcome, ScriptError> {
    let outcome = dispatcher.dispatch(request).await;

    if let Some(path) = dispatcher.flush_pending(&ctx.results_dir)? {
        info!(
            "Wrote {} pending timelock transaction(s) to {}",
            dispatcher.pending().len(),
            path.display()
        );
    }

    Ok(outcome?)
}

/// Call a function, through the timelock if the target is owned by it
pub async fn dispatch(args: DispatchArgs, ctx: &RunContext) -> Result<(), ScriptError> {
    if args.param_types.len() != args.param_values.len() {
        return Err(ScriptError::InvalidArgument(format!(
            "{} --param-type given but {} --param-value",
            args.param_types.len(),
            args.param_values.len()
        )));
    }

    let ledger = ctx.open_ledger()?;
    let target = ledger.resolve_address(&args.target)?;
    let param_values = args
        .param_types
        .iter()
        .zip(args.param_values.iter())
        .map(|(ty, value)| coerce_param(ty, value))
        .collect::<Result<Vec<_>, _>>()?;
    let value = parse_value(args.value.as_deref())?;
    let eta = resolve_eta(&args.eta)?;

    let client = setup_client(ctx, ledger.multicall()?)?;
    let mut dispatcher = setup_dispatcher(&client, &ledger, &args.title).await?;
    let owner = dispatcher.current_owner(target).await?;

    let request = DispatchRequest {
        target,
        owner,
        signature: args.signature,
        param_types: args.param_types,
        param_values,
        description: args.description,
        value,
        eta,
    };
    dispatch_and_flush(&mut dispatcher, request, ctx).await?;

    Ok(())
}

/// Allow or disallow strategies on a worker. The worker's recorded strategies are updated
/// once the call has executed; a call queued for the timelock leaves them untouched.
pub async fn set_worker_strategies(
    args: SetWorkerStrategiesArgs,
    ctx: &RunContext,
) -> Result<(), ScriptError> {
    let mut ledger = ctx.open_ledger()?;
    let worker = ledger.find::<WorkerEntry>(&args.vault, &args.worker)?.clone();
    let strategies = args
        .strategies
        .iter()
        .map(|key| resolve_strategy(&ledger, key))
        .collect::<Result<Vec<_>, _>>()?;
    let ok = !args.disable;
    let eta = resolve_eta(&args.eta)?;

    let client = setup_client(ctx, ledger.multicall()?)?;
    let mut dispatcher = setup_dispatcher(&client, &ledger, &args.title).await?;
    let owner = dispatcher.current_owner(worker.address).await?;

    let verb = if ok { "Allowing" } else { "Disallowing" };
    let request = DispatchRequest {
        target: worker.address,
        owner,
        signature: SET_STRATEGY_OK_SIGNATURE.to_string(),
        param_types: SET_STRATEGY_OK_PARAM_TYPES.iter().map(|ty| ty.to_string()).collect(),
        param_values: vec![
            DynSolValue::Array(strategies.iter().copied().map(DynSolValue::Address).collect()),
            DynSolValue::Bool(ok),
        ],
        description: format!("{} {} strategies on {}", verb, strategies.len(), worker.name),
        value: Default::default(),
        eta,
    };

    match dispatch_and_flush(&mut dispatcher, request, ctx).await? {
        DispatchOutcome::Executed(_) => {
            let mut updated = worker;
            if ok {
                for strategy in strategies {
                    if !updated.strategies.contains(&strategy) {
                        updated.strategies.push(strategy);
                    }
                }
            } else {
                updated.strategies.retain(|s| !strategies.contains(s));
            }

            let key = format!("{:#x}", updated.address);
            ledger.add_or_set_worker(&args.vault, &key, updated)?;
            info!("✅ Recorded strategies of {}", args.worker);
        },
        DispatchOutcome::Queued(_) => {
            warn!(
                "Strategies of {} are recorded once the timelock executes; re-record the worker then",
                args.worker
            );
        },
    }

    Ok(())
}

// --- Ledger records --- //

/// Record a token
pub fn record_token(args: RecordTokenArgs, ctx: &RunContext) -> Result<(), ScriptError> {
    let address = parse_address(&args.address)?;
    let mut ledger = ctx.open_ledger()?;

    info!("Recording token {}", args.symbol);
    let extra = ledger
        .find::<TokenEntry>(&(), &args.symbol)
        .map(|existing| existing.extra.clone())
        .unwrap_or_default();
    let key = args.symbol.clone();
    let entry = TokenEntry {
        name: args.name,
        symbol: args.symbol,
        address,
        deployed_block: args.deployed_block,
        decimals: args.decimals,
        extra,
    };
    ledger.add_or_set_token(&key, entry)?;

    info!("✅ Recorded in {}", ledger.path().display());
    Ok(())
}

/// Record a vault, keeping the workers and unmodeled keys already recorded for it
pub fn record_vault(args: RecordVaultArgs, ctx: &RunContext) -> Result<(), ScriptError> {
    let address = parse_address(&args.address)?;
    let debt_token = parse_optional_address(args.debt_token.as_deref())?;
    let config = parse_optional_address(args.config.as_deref())?;
    let triple_slope_model = parse_optional_address(args.triple_slope_model.as_deref())?;
    let mut ledger = ctx.open_ledger()?;
    let base_token = ledger.resolve_address(&args.base_token)?;

    info!("Recording vault {}", args.symbol);
    let (workers, extra) = ledger
        .find::<VaultEntry>(&(), &args.symbol)
        .map(|existing| (existing.workers.clone(), existing.extra.clone()))
        .unwrap_or_default();
    let key = args.symbol.clone();
    let entry = VaultEntry {
        name: args.name,
        symbol: args.symbol,
        address,
        deployed_block: args.deployed_block,
        base_token,
        debt_token,
        config,
        triple_slope_model,
        workers,
        extra,
    };
    ledger.add_or_set_vault(&key, entry)?;

    info!("✅ Recorded in {}", ledger.path().display());
    Ok(())
}

/// Record a worker under its vault
pub fn record_worker(args: RecordWorkerArgs, ctx: &RunContext) -> Result<(), ScriptError> {
    let address = parse_address(&args.address)?;
    let staking_token = parse_address(&args.staking_token)?;
    let staking_token_at = parse_optional_address(args.staking_token_at.as_deref())?;
    let config = parse_optional_address(args.config.as_deref())?;
    let mut ledger = ctx.open_ledger()?;
    let strategies = args
        .strategies
        .iter()
        .map(|key| resolve_strategy(&ledger, key))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Recording worker {} of {}", args.name, args.vault);
    let existing = ledger.find::<WorkerEntry>(&args.vault, &args.name).ok().cloned();
    let (strategies, extra) = match existing {
        Some(existing) if strategies.is_empty() => (existing.strategies, existing.extra),
        Some(existing) => (strategies, existing.extra),
        None => (strategies, Default::default()),
    };
    let key = args.name.clone();
    let entry = WorkerEntry {
        name: args.name,
        address,
        deployed_block: args.deployed_block,
        config,
        p_id: args.pid,
        staking_token,
        staking_token_at,
        strategies,
        extra,
    };
    ledger.add_or_set_worker(&args.vault, &key, entry)?;

    info!("✅ Recorded in {}", ledger.path().display());
    Ok(())
}

/// Record a protocol-wide address
pub fn record_singleton(args: RecordSingletonArgs, ctx: &RunContext) -> Result<(), ScriptError> {
    let address = parse_address(&args.address)?;
    let singleton: Singleton = args.singleton.into();
    let mut ledger = ctx.open_ledger()?;

    info!("Recording {} at {:#x}", singleton.key(), address);
    ledger.set_singleton(singleton, address)?;

    info!("✅ Recorded in {}", ledger.path().display());
    Ok(())
}

// --- Timelock replay --- //

/// Queue a file of pending transactions in the timelock
pub async fn queue_batch(args: BatchArgs, ctx: &RunContext) -> Result<(), ScriptError> {
    let txs = PendingBatch::read(&args.file)?;
    let ledger = ctx.open_ledger()?;
    let client = setup_client(ctx, ledger.multicall()?)?;
    let timelock = Timelock::new(&client, ledger.governance()?);

    let now = now_seconds();
    let delay = timelock.delay().await?;
    let early = timelock.check_etas(&txs, now, delay);
    if early > 0 {
        warn!("{} transaction(s) will be rejected by the timelock", early);
    }

    let mut nonces = NonceAllocator::for_signer(&client).await?;
    info!("Queueing {} transaction(s) from {}", txs.len(), args.file.display());
    timelock
        .submit_batch(TimelockAction::Queue, &txs, &mut nonces, now)
        .await?;

    info!("✅ Queued {} transaction(s)", txs.len());
    Ok(())
}

/// Execute a file of queued transactions through the timelock
pub async fn execute_batch(args: BatchArgs, ctx: &RunContext) -> Result<(), ScriptError> {
    let txs = PendingBatch::read(&args.file)?;
    let ledger = ctx.open_ledger()?;
    let client = setup_client(ctx, ledger.multicall()?)?;
    let timelock = Timelock::new(&client, ledger.governance()?);

    let mut nonces = NonceAllocator::for_signer(&client).await?;
    info!("Executing {} transaction(s) from {}", txs.len(), args.file.display());
    timelock
        .submit_batch(TimelockAction::Execute, &txs, &mut nonces, now_seconds())
        .await?;

    info!("✅ Executed {} transaction(s)", txs.len());
    Ok(())
}
