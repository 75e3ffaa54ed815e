//! ControlLoop: drives the engine on a Tokio interval.
//!
//! Lifecycle is `Idle -> Running -> Stopping -> Idle`, published on a
//! `watch` channel that the tick task selects against its interval timer.
//! Sources are sampled concurrently on blocking threads, each under a
//! deadline; the engine then runs the rest of the tick on a blocking thread
//! while holding its mutex. A source whose previous call is still running is
//! not called again until that call returns.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashSet;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use warden_core::config::WardenConfig;
use warden_core::errors::{CollectionError, WardenError, WardenResult};
use warden_core::models::{Alert, HealthMetric, HealthReport, RecoveryAction, SystemIssue};
use warden_core::traits::{IActionExecutor, IEscalationSink, IMetricSource};
use warden_observability::collection_span;
use warden_observability::tracing_setup::events;

use crate::collection::CollectionBatch;
use crate::engine::{HealingEngine, TickReport};
use crate::recovery::RecoveryOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopping,
}

impl LoopState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for [`ControlLoop`].
pub struct ControlLoopBuilder {
    config: WardenConfig,
    executor: Arc<dyn IActionExecutor>,
    escalation: Option<Arc<dyn IEscalationSink>>,
    sources: Vec<Arc<dyn IMetricSource>>,
}

impl ControlLoopBuilder {
    pub fn source(mut self, source: Arc<dyn IMetricSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn escalation(mut self, sink: Arc<dyn IEscalationSink>) -> Self {
        self.escalation = Some(sink);
        self
    }

    pub fn build(self) -> ControlLoop {
        let mut engine = HealingEngine::new(self.config, self.executor);
        if let Some(sink) = self.escalation {
            engine = engine.with_escalation(sink);
        }
        let monitor = engine.config().monitor.clone();
        let (state_tx, _) = watch::channel(LoopState::Idle);
        let outstanding = self.sources.iter().map(|_| None).collect();

        ControlLoop {
            shared: Arc::new(Shared {
                in_flight: engine.in_flight(),
                engine: Mutex::new(engine),
                sources: self.sources,
                outstanding: AsyncMutex::new(outstanding),
                interval: monitor.interval(),
                collection_timeout: monitor.collection_timeout(),
                state_tx,
            }),
            task: Mutex::new(None),
        }
    }
}

type CollectHandle = JoinHandle<Result<HashMap<String, f64>, CollectionError>>;

/// State shared between the handle and the tick task.
struct Shared {
    engine: Mutex<HealingEngine>,
    in_flight: Arc<DashSet<String>>,
    sources: Vec<Arc<dyn IMetricSource>>,
    /// Per source, by position: a call that outlived its deadline.
    outstanding: AsyncMutex<Vec<Option<CollectHandle>>>,
    interval: Duration,
    collection_timeout: Duration,
    state_tx: watch::Sender<LoopState>,
}

/// Handle to a running or idle control loop.
///
/// Query methods copy out of the engine under its mutex and never block on
/// a tick for longer than the tick's critical section.
pub struct ControlLoop {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ControlLoop {
    pub fn builder(config: WardenConfig, executor: Arc<dyn IActionExecutor>) -> ControlLoopBuilder {
        ControlLoopBuilder {
            config,
            executor,
            escalation: None,
            sources: Vec::new(),
        }
    }

    // --- lifecycle ---

    pub fn loop_state(&self) -> LoopState {
        *self.shared.state_tx.borrow()
    }

    /// Spawn the tick task. Fails with `AlreadyRunning` unless idle.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> WardenResult<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| WardenError::TaskJoin {
            reason: e.to_string(),
        })?;
        let mut task = self.task_slot()?;
        if !transition(&self.shared.state_tx, LoopState::Idle, LoopState::Running) {
            return Err(WardenError::AlreadyRunning);
        }

        tracing::info!(
            version = warden_core::constants::VERSION,
            interval_secs = self.shared.interval.as_secs(),
            sources = self.shared.sources.len(),
            "control loop starting"
        );
        let state_rx = self.shared.state_tx.subscribe();
        *task = Some(runtime.spawn(run(Arc::clone(&self.shared), state_rx)));
        Ok(())
    }

    /// Ask the tick task to stop. It finishes any tick in progress and
    /// returns to `Idle` without starting another.
    pub fn stop(&self) -> WardenResult<()> {
        if transition(&self.shared.state_tx, LoopState::Running, LoopState::Stopping) {
            Ok(())
        } else {
            Err(WardenError::NotRunning)
        }
    }

    /// Stop the loop if it is running and wait for the tick task to exit.
    pub async fn shutdown(&self) -> WardenResult<()> {
        match self.stop() {
            Ok(()) | Err(WardenError::NotRunning) => {}
            Err(e) => return Err(e),
        }
        let handle = self.task_slot()?.take();
        if let Some(handle) = handle {
            handle.await.map_err(|e| WardenError::TaskJoin {
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Run one tick now, independent of the interval timer.
    pub async fn tick(&self) -> WardenResult<TickReport> {
        self.shared.tick().await
    }

    fn task_slot(&self) -> WardenResult<MutexGuard<'_, Option<JoinHandle<()>>>> {
        self.task.lock().map_err(|e| WardenError::LockPoisoned {
            what: format!("control loop task: {e}"),
        })
    }

    // --- queries ---

    pub fn active_issues(&self) -> WardenResult<Vec<SystemIssue>> {
        Ok(self.shared.engine().active_issues())
    }

    pub fn resolved_issues(&self, limit: usize) -> WardenResult<Vec<SystemIssue>> {
        Ok(self.shared.engine().resolved_issues(limit))
    }

    pub fn recent_metrics(&self, name: &str, limit: usize) -> WardenResult<Vec<HealthMetric>> {
        Ok(self.shared.engine().recent_metrics(name, limit))
    }

    pub fn recovery_history(&self, limit: usize) -> WardenResult<Vec<RecoveryAction>> {
        Ok(self.shared.engine().recovery_history(limit))
    }

    pub fn escalated_issues(&self) -> WardenResult<Vec<SystemIssue>> {
        Ok(self.shared.engine().escalated_issues())
    }

    pub fn alerts(&self) -> WardenResult<Vec<Alert>> {
        Ok(self.shared.engine().alerts(Utc::now()))
    }

    pub fn health_report(&self) -> WardenResult<HealthReport> {
        let is_monitoring = self.loop_state() == LoopState::Running;
        Ok(self.shared.engine().health_report(is_monitoring, Utc::now()))
    }

    /// Lock-free: does not wait for a tick in progress.
    pub fn is_recovery_in_flight(&self, issue_id: &str) -> bool {
        self.shared.in_flight.contains(issue_id)
    }

    // --- mutators ---

    pub fn dismiss_issue(&self, id: &str) -> WardenResult<SystemIssue> {
        self.shared.engine().dismiss_issue(id, Utc::now())
    }

    /// Run another planning round for an active issue on a blocking thread.
    pub async fn replan_issue(&self, id: &str) -> WardenResult<RecoveryOutcome> {
        let shared = Arc::clone(&self.shared);
        let id = id.to_string();
        tokio::task::spawn_blocking(move || -> WardenResult<RecoveryOutcome> {
            shared.engine().replan_issue(&id, Utc::now())
        })
        .await
            .map_err(|e| WardenError::TaskJoin {
                reason: e.to_string(),
            })?
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        transition(&self.shared.state_tx, LoopState::Running, LoopState::Stopping);
    }
}

impl Shared {
    /// Lock the engine, clearing poison left by a panicked holder.
    fn engine(&self) -> MutexGuard<'_, HealingEngine> {
        self.engine.lock().unwrap_or_else(|poisoned| {
            tracing::error!("healing engine lock poisoned, recovering");
            self.engine.clear_poison();
            poisoned.into_inner()
        })
    }

    async fn tick(self: &Arc<Self>) -> WardenResult<TickReport> {
        let batch = self.collect().await;
        let shared = Arc::clone(self);
        tokio::task::spawn_blocking(move || -> TickReport {
            shared.engine().run_tick(batch, Utc::now())
        })
        .await
            .map_err(|e| WardenError::TaskJoin {
                reason: e.to_string(),
            })
    }

    /// Sample every source concurrently. A source that errors, panics, or
    /// misses the shared deadline contributes a failed report.
    ///
    /// A call that misses the deadline is kept; until it returns, its source
    /// is reported as timed out without being called again.
    async fn collect(&self) -> CollectionBatch {
        let deadline = Instant::now() + self.collection_timeout;
        let timeout_ms = u64::try_from(self.collection_timeout.as_millis()).unwrap_or(u64::MAX);
        let mut outstanding = self.outstanding.lock().await;

        let pending: Vec<(String, Option<CollectHandle>)> = self
            .sources
            .iter()
            .zip(outstanding.iter_mut())
            .map(|(source, slot)| {
                let name = source.name().to_string();
                if let Some(handle) = slot.take() {
                    if !handle.is_finished() {
                        tracing::debug!(source = %name, "previous collection still running");
                        *slot = Some(handle);
                        return (name, None);
                    }
                }
                let source = Arc::clone(source);
                let span = collection_span!(name);
                let handle = tokio::task::spawn_blocking(move || {
                    let _enter = span.enter();
                    source.collect()
                });
                (name, Some(handle))
            })
            .collect();

        let mut batch = CollectionBatch::new();
        for (slot, (name, handle)) in pending.into_iter().enumerate() {
            let timed_out = CollectionError::Timeout {
                source_name: name.clone(),
                timeout_ms,
            };
            let result = match handle {
                None => Err(timed_out),
                Some(mut handle) => match tokio::time::timeout_at(deadline, &mut handle).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(_)) => Err(CollectionError::Panicked {
                        source_name: name.clone(),
                    }),
                    Err(_) => {
                        outstanding[slot] = Some(handle);
                        Err(timed_out)
                    }
                },
            };
            batch.push(name, result);
        }
        batch
    }
}

/// Tick task body: tick on every interval until the state leaves `Running`.
async fn run(shared: Arc<Shared>, mut state_rx: watch::Receiver<LoopState>) {
    let mut interval = tokio::time::interval(shared.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        if *state_rx.borrow_and_update() != LoopState::Running {
            break;
        }
        if let Err(e) = shared.tick().await {
            tracing::error!(error = %e, "tick failed");
        }
    }

    let previous = shared.state_tx.send_replace(LoopState::Idle);
    events::loop_state_changed(previous.as_str(), LoopState::Idle.as_str());
}

/// Move `tx` from `from` to `to`. Returns false, changing nothing, if the
/// current state is not `from`.
fn transition(tx: &watch::Sender<LoopState>, from: LoopState, to: LoopState) -> bool {
    let moved = tx.send_if_modified(|state| {
        if *state == from {
            *state = to;
            true
        } else {
            false
        }
    });
    if moved {
        events::loop_state_changed(from.as_str(), to.as_str());
    }
    moved
}
