//! HealingEngine: the synchronous core of the controller.
//!
//! One call to [`HealingEngine::run_tick`] is one critical section: record
//! samples (with fallbacks), detect, plan and execute recovery for new
//! issues, then verify every active issue. The engine never reads the wall
//! clock; every operation takes `now` explicitly.

use std::collections::{BTreeMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use warden_core::config::WardenConfig;
use warden_core::constants::FALLBACK_LAST_KNOWN;
use warden_core::errors::{CollectionError, ConfigError, WardenError, WardenResult};
use warden_core::models::{
    Alert, DegradationEvent, HealthMetric, HealthReport, IssueType, RecoveryAction, SystemIssue,
};
use warden_core::traits::{IActionExecutor, IEscalationSink, NoopEscalation};
use warden_observability::tracing_setup::events;
use warden_observability::{
    escalation_alerts, evaluate_alerts, recovery_span, tick_span, HealthReporter, HealthSnapshot,
};

use crate::collection::CollectionBatch;
use crate::detection::IssueDetector;
use crate::evaluator::HealthEvaluator;
use crate::recovery::{execute_plan, InFlightGuard, RecoveryOutcome, RecoveryPlanner};
use crate::state::ControllerState;
use crate::verification::ResolutionVerifier;

/// Fallback label for a source that failed before it ever reported a metric.
const FALLBACK_SKIPPED: &str = "skipped";

/// Largest backoff `chrono::Duration` can represent in seconds.
const MAX_BACKOFF_SECS: i64 = i64::MAX / 1_000;

/// Summary of one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    /// Samples recorded, fallbacks included.
    pub samples: usize,
    pub fallbacks: usize,
    /// Ids of issues detected this tick.
    pub detected: Vec<String>,
    /// Ids of issues verified as resolved this tick.
    pub resolved: Vec<String>,
    /// Ids of issues whose recovery was exhausted this tick.
    pub escalated: Vec<String>,
}

/// A sample chosen for a metric this tick.
struct Sample {
    value: f64,
    /// Why the metric fell back, if it did.
    failure: Option<String>,
}

impl Sample {
    fn is_fallback(&self) -> bool {
        self.failure.is_some()
    }
}

pub struct HealingEngine {
    config: WardenConfig,
    config_warnings: Vec<ConfigError>,
    planner: RecoveryPlanner,
    detector: IssueDetector,
    verifier: ResolutionVerifier,
    executor: Arc<dyn IActionExecutor>,
    escalation: Arc<dyn IEscalationSink>,
    in_flight: Arc<DashSet<String>>,
    state: ControllerState,
}

impl HealingEngine {
    /// Build an engine from `config`, repairing invalid values.
    ///
    /// Each repair is logged and kept in [`Self::config_warnings`].
    pub fn new(config: WardenConfig, executor: Arc<dyn IActionExecutor>) -> Self {
        let (config, config_warnings) = config.repaired();
        for problem in &config_warnings {
            events::config_repaired(&problem.to_string());
        }

        Self {
            planner: RecoveryPlanner::new(config.strategies.clone()),
            detector: IssueDetector::new(config.rules.clone()),
            verifier: ResolutionVerifier::from_rules(&config.rules),
            state: ControllerState::new(&config.history),
            executor,
            escalation: Arc::new(NoopEscalation),
            in_flight: Arc::new(DashSet::new()),
            config,
            config_warnings,
        }
    }

    pub fn with_escalation(mut self, sink: Arc<dyn IEscalationSink>) -> Self {
        self.escalation = sink;
        self
    }

    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    /// Problems found and repaired in the configuration at construction.
    pub fn config_warnings(&self) -> &[ConfigError] {
        &self.config_warnings
    }

    /// Shared handle to the in-flight set, readable without the engine.
    pub fn in_flight(&self) -> Arc<DashSet<String>> {
        Arc::clone(&self.in_flight)
    }

    pub fn is_recovery_in_flight(&self, issue_id: &str) -> bool {
        self.in_flight.contains(issue_id)
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    // --- tick ---

    /// Run one full tick over `batch`.
    pub fn run_tick(&mut self, batch: CollectionBatch, now: DateTime<Utc>) -> TickReport {
        let tick = self.state.next_tick();
        let span = tick_span!(tick);
        let _enter = span.enter();

        let (samples, fallbacks) = self.record_samples(batch, now);
        let (detected, escalated) = self.detect_and_recover(now);
        let resolved = self.verify_active(now);

        events::tick_completed(samples, fallbacks, detected.len(), resolved.len());
        TickReport {
            tick,
            samples,
            fallbacks,
            detected,
            resolved,
            escalated,
        }
    }

    /// Evaluate and record one sample per metric, substituting the last known
    /// value for anything a source failed to deliver.
    ///
    /// Degradation events are recorded only for metrics whose final sample
    /// is a fallback. Returns `(samples recorded, of which fallbacks)`.
    pub fn record_samples(&mut self, batch: CollectionBatch, now: DateTime<Utc>) -> (usize, usize) {
        let mut chosen: BTreeMap<String, Sample> = BTreeMap::new();
        let mut recovered: HashSet<String> = HashSet::new();

        for report in batch {
            match report.result {
                Ok(values) => {
                    recovered.insert(report.source.clone());
                    for (name, value) in &values {
                        if value.is_finite() {
                            self.state.learn_metric(&report.source, name);
                            recovered.insert(name.clone());
                            choose(&mut chosen, name, *value, None);
                        } else {
                            let failure = CollectionError::NonFinite {
                                metric: name.clone(),
                            };
                            self.fall_back(&mut chosen, name, &failure);
                        }
                    }
                    for name in self.state.expected_metrics(&report.source) {
                        if !values.contains_key(&name) {
                            let failure = CollectionError::Missing {
                                metric: name.clone(),
                                source_name: report.source.clone(),
                            };
                            self.fall_back(&mut chosen, &name, &failure);
                        }
                    }
                }
                Err(failure) => {
                    let expected = self.state.expected_metrics(&report.source);
                    if expected.is_empty() {
                        self.state.degradation.record(DegradationEvent::new(
                            report.source.as_str(),
                            describe(&failure),
                            FALLBACK_SKIPPED,
                            now,
                        ));
                    }
                    for name in expected {
                        self.fall_back(&mut chosen, &name, &failure);
                    }
                }
            }
        }

        for component in &recovered {
            if !chosen.get(component).is_some_and(Sample::is_fallback) {
                self.state.degradation.mark_recovered(component, now);
            }
        }

        let mut fallbacks = 0;
        let samples = chosen.len();
        for (name, sample) in chosen {
            let status = HealthEvaluator::evaluate(&name, sample.value, &self.config.thresholds);
            let mut metric = HealthMetric::new(name.as_str(), sample.value, status, now);
            if let Some(failure) = sample.failure {
                self.state.degradation.record(DegradationEvent::new(
                    name.as_str(),
                    failure,
                    FALLBACK_LAST_KNOWN,
                    now,
                ));
                metric = metric.as_fallback();
                fallbacks += 1;
            }
            self.state.history.record(metric);
        }
        (samples, fallbacks)
    }

    /// Offer the last known value of `name` as a fallback candidate.
    fn fall_back(
        &self,
        chosen: &mut BTreeMap<String, Sample>,
        name: &str,
        failure: &CollectionError,
    ) {
        if chosen.get(name).is_some_and(|s| !s.is_fallback()) {
            return;
        }
        let Some(last) = self.state.history.latest(name).map(|m| m.value) else {
            return;
        };
        choose(chosen, name, last, Some(describe(failure)));
    }

    /// Detect new issues and run one planning round for each.
    ///
    /// Returns `(detected ids, escalated ids)`.
    pub fn detect_and_recover(&mut self, now: DateTime<Utc>) -> (Vec<String>, Vec<String>) {
        let state = &self.state;
        let new_issues = self.detector.detect(
            &state.history,
            &self.config.thresholds,
            |issue_type| state.has_active(issue_type),
            now,
        );

        let mut detected = Vec::new();
        let mut escalated = Vec::new();
        for issue in new_issues {
            let issue_type = issue.issue_type.clone();
            events::issue_detected(&issue.id, &issue_type, issue.severity, issue.observed_value);
            let id = issue.id.clone();
            if !self.state.insert_active(issue) {
                continue;
            }
            detected.push(id.clone());

            match self.plan(&issue_type, now) {
                Ok(outcome) if outcome.exhausted() => escalated.push(id),
                Ok(_) => {}
                Err(e) => tracing::warn!(issue_id = %id, error = %e, "recovery skipped"),
            }
        }
        (detected, escalated)
    }

    /// Close every active issue whose resolution condition holds.
    ///
    /// Returns the ids of issues resolved.
    pub fn verify_active(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut resolved = Vec::new();
        for issue_type in self.state.active_types() {
            let Some(issue) = self.state.active(&issue_type) else {
                continue;
            };
            if !self
                .verifier
                .verify(issue, &self.state.history, &self.config.thresholds)
            {
                continue;
            }
            if let Some(issue) = self.state.active_mut(&issue_type) {
                issue.resolve(now);
            }
            if let Some(issue) = self.state.retire(&issue_type) {
                events::issue_resolved(&issue.id, &issue.issue_type);
                resolved.push(issue.id);
            }
        }
        resolved
    }

    /// One planning round for the active issue of `issue_type`.
    fn plan(&mut self, issue_type: &IssueType, now: DateTime<Utc>) -> WardenResult<RecoveryOutcome> {
        let issue = self
            .state
            .active(issue_type)
            .cloned()
            .ok_or_else(|| WardenError::IssueNotFound {
                id: issue_type.to_string(),
            })?;
        let guard = InFlightGuard::acquire(&self.in_flight, &issue.id)?;
        let span = recovery_span!(issue.id, issue.issue_type);
        let _enter = span.enter();

        let strategies = self.planner.strategies_for(issue_type);
        let outcome = execute_plan(strategies, &issue, self.executor.as_ref(), now);
        drop(guard);

        for action in &outcome.actions {
            self.state.push_action(action.clone());
        }
        let Some(active) = self.state.active_mut(issue_type) else {
            return Ok(outcome);
        };
        active
            .resolution_actions
            .extend(outcome.actions.iter().map(|a| a.id.clone()));
        active.last_planned_at = Some(now);
        active.escalated = outcome.exhausted();

        if outcome.exhausted() {
            events::issue_escalated(&active.id, &active.issue_type, outcome.actions.len());
            let sink = self.escalation.as_ref();
            let issue = &*active;
            if catch_unwind(AssertUnwindSafe(|| sink.escalate(issue))).is_err() {
                events::escalation_panicked(&issue.id, &issue.issue_type);
            }
        }
        Ok(outcome)
    }

    // --- mutators ---

    /// Close an active issue on a caller's request and move it to history.
    pub fn dismiss_issue(&mut self, id: &str, now: DateTime<Utc>) -> WardenResult<SystemIssue> {
        let issue_type = self.find_active(id)?;
        if self.in_flight.contains(id) {
            return Err(WardenError::RecoveryInFlight { id: id.to_string() });
        }
        if let Some(issue) = self.state.active_mut(&issue_type) {
            issue.dismiss(now);
        }
        let issue = self
            .state
            .retire(&issue_type)
            .ok_or_else(|| WardenError::IssueNotFound { id: id.to_string() })?;
        events::issue_dismissed(&issue.id, &issue.issue_type);
        Ok(issue)
    }

    /// Run another planning round for an active issue.
    ///
    /// Refused with `ReplanBackoff` until the configured backoff has passed
    /// since the issue's last round.
    pub fn replan_issue(&mut self, id: &str, now: DateTime<Utc>) -> WardenResult<RecoveryOutcome> {
        let issue_type = self.find_active(id)?;
        let backoff_secs = i64::try_from(self.config.recovery.replan_backoff_secs)
            .unwrap_or(i64::MAX)
            .min(MAX_BACKOFF_SECS);
        let backoff = chrono::Duration::seconds(backoff_secs);
        let last_planned = self.state.active(&issue_type).and_then(|i| i.last_planned_at);
        if let Some(last) = last_planned {
            let elapsed = now - last;
            if elapsed < backoff {
                let remaining = (backoff - elapsed).num_seconds().max(1);
                return Err(WardenError::ReplanBackoff {
                    id: id.to_string(),
                    remaining_secs: u64::try_from(remaining).unwrap_or(1),
                });
            }
        }
        self.plan(&issue_type, now)
    }

    fn find_active(&self, id: &str) -> WardenResult<IssueType> {
        self.state
            .find_active(id)
            .ok_or_else(|| WardenError::IssueNotFound { id: id.to_string() })
    }

    // --- queries ---

    pub fn active_issues(&self) -> Vec<SystemIssue> {
        self.state.active_issues()
    }

    /// Up to `limit` closed issues, most recent last.
    pub fn resolved_issues(&self, limit: usize) -> Vec<SystemIssue> {
        self.state.resolved_issues(limit)
    }

    pub fn recent_metrics(&self, name: &str, limit: usize) -> Vec<HealthMetric> {
        self.state.history.recent(name, limit)
    }

    pub fn recovery_history(&self, limit: usize) -> Vec<RecoveryAction> {
        self.state.recovery_history(limit)
    }

    /// Active issues whose last planning round exhausted every strategy.
    pub fn escalated_issues(&self) -> Vec<SystemIssue> {
        self.state
            .active_issues()
            .into_iter()
            .filter(|issue| issue.escalated)
            .collect()
    }

    /// Collection alerts plus one critical alert per escalated issue.
    pub fn alerts(&self, now: DateTime<Utc>) -> Vec<Alert> {
        let mut alerts = evaluate_alerts(&self.state.degradation, now);
        let active = self.state.active_issues();
        alerts.extend(escalation_alerts(active.iter()));
        alerts
    }

    pub fn health_report(&self, is_monitoring: bool, now: DateTime<Utc>) -> HealthReport {
        let snapshot = HealthSnapshot {
            is_monitoring,
            latest_metrics: self.state.history.latest_all(),
            thresholds: self.config.thresholds.clone(),
            active_issues: self.state.active_issues(),
            resolved_issues: self.state.all_resolved().cloned().collect(),
            recovery_actions: self.state.all_actions().cloned().collect(),
            alerts: self.alerts(now),
        };
        HealthReporter::build(snapshot, now)
    }
}

/// Keep the first valid value for a metric; a valid value replaces a fallback.
fn choose(chosen: &mut BTreeMap<String, Sample>, name: &str, value: f64, failure: Option<String>) {
    match chosen.get(name) {
        Some(existing) if !existing.is_fallback() || failure.is_some() => {}
        _ => {
            chosen.insert(name.to_string(), Sample { value, failure });
        }
    }
}

fn describe(failure: &CollectionError) -> String {
    format!("{}: {}", failure.kind(), failure)
}
