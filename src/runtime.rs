//! Periodic tasks driving the shared engine: tick, log, and daily reset.
//!
//! Each task takes the engine lock only for one transition or snapshot and
//! releases it before touching the filesystem. Writers of the state file hold
//! the store's order lock from snapshot to save, so a stale snapshot never
//! overwrites a newer one. File I/O runs on the blocking pool.

use std::time::Duration;

use chrono::{Local, NaiveDateTime, TimeDelta};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::SimulatorConfig;
use crate::io::{EventLogger, PersistResult, StateStore};
use crate::sim::engine::SharedEngine;
use crate::sim::reset::ResetScheduler;

/// Local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Builds an interval whose first tick is one `period` from now.
fn delayed_interval(period: Duration) -> time::Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Persists the current snapshot to the state file.
pub async fn save_snapshot(engine: &SharedEngine, store: &StateStore) -> PersistResult<()> {
    let _order = store.order().await;
    let snapshot = engine.lock().await.snapshot();
    store.save_blocking(snapshot).await
}

/// Appends one log row stamped `now` and refreshes the state file.
///
/// Both writes are attempted; the first failure is returned.
pub async fn log_once(
    engine: &SharedEngine,
    store: &StateStore,
    logger: &EventLogger,
    now: NaiveDateTime,
) -> PersistResult<()> {
    let _order = store.order().await;
    let snapshot = engine.lock().await.snapshot();
    tracing::debug!(%snapshot, "logging snapshot");

    let (store, logger) = (store.clone(), logger.clone());
    tokio::task::spawn_blocking(move || {
        let logged = logger.append(now, &snapshot);
        let saved = store.save(&snapshot);
        logged.and(saved)
    })
    .await?
}

/// Polls the reset scheduler at `now`; on fire, resets the engine and
/// persists the resulting snapshot.
///
/// Returns whether a reset happened. A failed save is logged and does not
/// undo the reset.
pub async fn check_reset(
    engine: &SharedEngine,
    scheduler: &mut ResetScheduler,
    store: &StateStore,
    now: NaiveDateTime,
) -> bool {
    if !scheduler.poll(now) {
        return false;
    }

    let _order = store.order().await;
    let snapshot = {
        let mut guard = engine.lock().await;
        guard.reset_to_baseline();
        guard.snapshot()
    };
    tracing::info!(at = %now, stored = snapshot.stored_energy, "daily reset");
    if let Err(e) = store.save_blocking(snapshot).await {
        tracing::error!(error = %e, "failed to persist state after reset");
    }
    true
}

/// Advances price and battery once per `period`, forever.
///
/// The first tick runs immediately.
pub async fn run_tick_loop(engine: SharedEngine, period: Duration) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        engine.lock().await.tick();
    }
}

/// Logs and persists a snapshot once per `period`, forever.
///
/// The first row is written one `period` after start; rows are stamped
/// with `clock`.
pub async fn run_log_loop<C>(
    engine: SharedEngine,
    store: StateStore,
    logger: EventLogger,
    period: Duration,
    clock: C,
) where
    C: Fn() -> NaiveDateTime,
{
    let mut interval = delayed_interval(period);
    loop {
        interval.tick().await;
        if let Err(e) = log_once(&engine, &store, &logger, clock()).await {
            tracing::warn!(error = %e, "failed to write log tick");
        }
    }
}

/// Checks the daily reset target against `clock` once per `period`, forever.
///
/// The first check runs immediately.
pub async fn run_reset_loop<C>(
    engine: SharedEngine,
    mut scheduler: ResetScheduler,
    store: StateStore,
    period: Duration,
    clock: C,
) where
    C: Fn() -> NaiveDateTime,
{
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        check_reset(&engine, &mut scheduler, &store, clock()).await;
    }
}

/// Spawns the tick, log and reset tasks on the current runtime, reading
/// wall time from `clock`.
///
/// # Arguments
///
/// * `engine` - Shared engine
/// * `cfg` - Validated configuration
/// * `store` - Snapshot store
/// * `logger` - Event logger
/// * `clock` - Wall-clock source, normally [`local_now`]
pub fn spawn_tasks<C>(
    engine: SharedEngine,
    cfg: &SimulatorConfig,
    store: StateStore,
    logger: EventLogger,
    clock: C,
) -> Vec<JoinHandle<()>>
where
    C: Fn() -> NaiveDateTime + Clone + Send + Sync + 'static,
{
    let s = &cfg.simulation;
    let r = &cfg.reset;
    let scheduler = ResetScheduler::new(
        r.hour,
        r.minute,
        TimeDelta::seconds(i64::try_from(r.cooldown_secs).unwrap_or(86_400)),
    );
    tracing::info!(
        tick_secs = s.tick_interval_secs,
        log_secs = s.log_interval_secs,
        reset_hour = r.hour,
        reset_minute = r.minute,
        "starting periodic tasks"
    );

    vec![
        tokio::spawn(run_tick_loop(
            engine.clone(),
            Duration::from_secs(s.tick_interval_secs),
        )),
        tokio::spawn(run_log_loop(
            engine.clone(),
            store.clone(),
            logger,
            Duration::from_secs(s.log_interval_secs),
            clock.clone(),
        )),
        tokio::spawn(run_reset_loop(
            engine,
            scheduler,
            store,
            Duration::from_secs(s.reset_check_interval_secs),
            clock,
        )),
    ]
}
