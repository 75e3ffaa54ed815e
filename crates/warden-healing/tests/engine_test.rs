use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use test_fixtures::{
    load_scenario, Outcome, PanickingEscalation, RecordingEscalation, ScriptedExecutor,
};
use warden_core::config::{HistoryConfig, Thresholds, WardenConfig};
use warden_core::errors::{CollectionError, WardenError};
use warden_core::models::{AlertLevel, IssueType, Status};
use warden_healing::{CollectionBatch, HealingEngine};

fn at(tick: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(tick * 30)
}

fn engine(executor: ScriptedExecutor) -> HealingEngine {
    HealingEngine::new(WardenConfig::default(), Arc::new(executor))
}

fn values(pairs: &[(&str, f64)]) -> CollectionBatch {
    CollectionBatch::from_values("host", pairs.iter().copied())
}

fn failed(source: &str) -> CollectionBatch {
    let mut batch = CollectionBatch::new();
    batch.push(
        source,
        Err(CollectionError::SourceFailed {
            source_name: source.to_string(),
            reason: "connection refused".into(),
        }),
    );
    batch
}

// ── End to end ────────────────────────────────────────────────────────────

#[test]
fn memory_leak_is_detected_recovered_and_verified() {
    let scenario = load_scenario("memory_leak");
    let executor = Arc::new(ScriptedExecutor::always_succeed());
    let mut engine = HealingEngine::new(WardenConfig::default(), executor.clone());

    let mut detected_at = None;
    for (i, tick) in scenario.ticks.iter().take(6).enumerate() {
        let report = engine.run_tick(
            CollectionBatch::from_values(&scenario.source, tick.iter().map(|(k, v)| (k.as_str(), *v))),
            at(i as i64),
        );
        if !report.detected.is_empty() && detected_at.is_none() {
            detected_at = Some(i + 1);
        }
    }
    assert_eq!(detected_at, scenario.expected_detection_tick);

    let active = engine.active_issues();
    assert_eq!(active.len(), 1);
    let issue = &active[0];
    assert_eq!(issue.issue_type.as_str(), scenario.expected_issue_type.as_deref().unwrap());
    assert_eq!(issue.severity, Status::Warning);
    assert_eq!(issue.resolution_actions.len(), 1);
    assert!(!issue.escalated);
    assert_eq!(executor.calls(), vec!["restart_affected_service"]);

    // A successful action alone does not close the issue.
    assert!(issue.resolved_at.is_none());

    let last = &scenario.ticks[6];
    let report = engine.run_tick(
        CollectionBatch::from_values(&scenario.source, last.iter().map(|(k, v)| (k.as_str(), *v))),
        at(6),
    );
    assert_eq!(report.resolved, vec![issue.id.clone()]);
    assert!(engine.active_issues().is_empty());

    let resolved = engine.resolved_issues(10);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].resolved_at, Some(at(6)));
    assert!(resolved[0].auto_resolved);
    assert!(!resolved[0].dismissed);
}

#[test]
fn disk_over_critical_raises_critical_issue_immediately() {
    let scenario = load_scenario("disk_full");
    let mut engine = engine(ScriptedExecutor::always_succeed());
    let tick = &scenario.ticks[0];
    let report = engine.run_tick(
        CollectionBatch::from_values(&scenario.source, tick.iter().map(|(k, v)| (k.as_str(), *v))),
        at(0),
    );

    assert_eq!(report.detected.len(), 1);
    let active = engine.active_issues();
    assert_eq!(active[0].issue_type, IssueType::DiskSpaceLow);
    assert_eq!(active[0].severity, Status::Critical);
    assert_eq!(engine.recent_metrics("disk_usage", 1)[0].status, Status::Critical);
}

#[test]
fn slow_responses_resolve_once_the_short_average_recovers() {
    let scenario = load_scenario("slow_responses");
    let mut engine = engine(ScriptedExecutor::always_succeed());
    let mut resolved_on = None;
    for (i, tick) in scenario.ticks.iter().enumerate() {
        let report = engine.run_tick(
            CollectionBatch::from_values(&scenario.source, tick.iter().map(|(k, v)| (k.as_str(), *v))),
            at(i as i64),
        );
        if i == 0 {
            assert_eq!(report.detected.len(), 1);
        }
        if !report.resolved.is_empty() {
            resolved_on = Some(i + 1);
        }
    }
    assert_eq!(resolved_on, Some(8));
    assert_eq!(engine.resolved_issues(5).len(), 1);
}

#[test]
fn sustained_condition_keeps_a_single_active_issue() {
    let mut engine = engine(ScriptedExecutor::always_succeed());
    for tick in 0..15 {
        engine.run_tick(values(&[("disk_usage", 90.0)]), at(tick));
    }
    assert_eq!(engine.active_issues().len(), 1);
    // Planned once at detection, never again without an explicit replan.
    assert_eq!(engine.recovery_history(100).len(), 1);
}

// ── Collection fallbacks ──────────────────────────────────────────────────

#[test]
fn failed_source_falls_back_to_last_known_value() {
    let mut engine = engine(ScriptedExecutor::always_succeed());
    engine.run_tick(values(&[("cpu_usage", 42.0), ("memory_usage", 50.0)]), at(0));
    let report = engine.run_tick(failed("host"), at(1));

    assert_eq!(report.samples, 2);
    assert_eq!(report.fallbacks, 2);
    let cpu = engine.recent_metrics("cpu_usage", 10);
    assert_eq!(cpu.len(), 2);
    assert!(cpu[1].fallback);
    assert_eq!(cpu[1].value, 42.0);
    assert_eq!(cpu[1].timestamp, at(1));

    let tracker = &engine.state().degradation;
    assert_eq!(tracker.len(), 2);
    assert!(tracker.is_degraded("cpu_usage"));

    engine.run_tick(values(&[("cpu_usage", 43.0), ("memory_usage", 51.0)]), at(2));
    assert!(!engine.state().degradation.is_degraded("cpu_usage"));
    assert!(!engine.recent_metrics("cpu_usage", 1)[0].fallback);
}

#[test]
fn never_seen_metrics_are_skipped_not_invented() {
    let mut engine = engine(ScriptedExecutor::always_succeed());
    let report = engine.run_tick(failed("host"), at(0));

    assert_eq!(report.samples, 0);
    assert!(engine.state().history.is_empty());
    let events: Vec<_> = engine.state().degradation.events().collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.component, "host");
    assert_eq!(events[0].event.fallback_used, "skipped");
}

#[test]
fn non_finite_and_missing_values_fall_back_per_metric() {
    let mut engine = engine(ScriptedExecutor::always_succeed());
    engine.run_tick(
        values(&[("cpu_usage", 40.0), ("memory_usage", 50.0), ("disk_usage", 60.0)]),
        at(0),
    );
    let report = engine.run_tick(
        values(&[("cpu_usage", f64::NAN), ("memory_usage", 55.0)]),
        at(1),
    );

    assert_eq!(report.samples, 3);
    assert_eq!(report.fallbacks, 2);
    assert_eq!(engine.recent_metrics("memory_usage", 1)[0].value, 55.0);
    assert!(engine.recent_metrics("cpu_usage", 1)[0].fallback);
    assert_eq!(engine.recent_metrics("disk_usage", 1)[0].value, 60.0);

    let failures: Vec<String> = engine
        .state()
        .degradation
        .events()
        .map(|t| t.event.failure.clone())
        .collect();
    assert!(failures.iter().any(|f| f.contains("non-finite")));
    assert!(failures.iter().any(|f| f.contains("missing")));
}

#[test]
fn a_valid_value_from_any_source_beats_a_fallback() {
    let mut engine = engine(ScriptedExecutor::always_succeed());
    let mut first = CollectionBatch::new();
    first.push("a", Ok(HashMap::from([("cpu_usage".to_string(), 40.0)])));
    first.push("b", Ok(HashMap::from([("cpu_usage".to_string(), 41.0)])));
    engine.run_tick(first, at(0));
    assert_eq!(engine.recent_metrics("cpu_usage", 10).len(), 1);

    let mut second = failed("a");
    second.push("b", Ok(HashMap::from([("cpu_usage".to_string(), 45.0)])));
    let report = engine.run_tick(second, at(1));
    assert_eq!(report.fallbacks, 0);
    let latest = &engine.recent_metrics("cpu_usage", 1)[0];
    assert_eq!(latest.value, 45.0);
    assert!(!latest.fallback);
    // The failed source comes first, but nothing fell back.
    assert!(engine.state().degradation.is_empty());

    // Once no source delivers a value the fallback is logged once.
    let mut third = failed("a");
    third.push("b", Ok(HashMap::new()));
    let report = engine.run_tick(third, at(2));
    assert_eq!(report.fallbacks, 1);
    assert_eq!(engine.state().degradation.len(), 1);
    let event = &engine.state().degradation.events().next().unwrap().event;
    assert!(event.failure.starts_with("source_failed"));
}

// ── Recovery ──────────────────────────────────────────────────────────────

#[test]
fn exhausted_strategies_escalate_once() {
    let sink = Arc::new(RecordingEscalation::new());
    let mut engine = HealingEngine::new(
        WardenConfig::default(),
        Arc::new(ScriptedExecutor::always_fail()),
    )
    .with_escalation(sink.clone());

    let first = engine.run_tick(values(&[("disk_usage", 90.0)]), at(0));
    for tick in 1..5 {
        engine.run_tick(values(&[("disk_usage", 90.0)]), at(tick));
    }

    assert_eq!(first.escalated.len(), 1);
    assert_eq!(sink.escalated().len(), 1);
    assert_eq!(engine.recovery_history(100).len(), 4);

    let escalated = engine.escalated_issues();
    assert_eq!(escalated.len(), 1);
    assert_eq!(escalated[0].resolution_actions.len(), 4);

    let alerts = engine.alerts(at(5));
    assert!(alerts
        .iter()
        .any(|a| a.level == AlertLevel::Critical && a.subject == escalated[0].id));
}

#[test]
fn panicking_escalation_sink_is_contained() {
    let sink = Arc::new(PanickingEscalation::new());
    let mut engine = HealingEngine::new(
        WardenConfig::default(),
        Arc::new(ScriptedExecutor::always_fail()),
    )
    .with_escalation(sink.clone());

    let report = engine.run_tick(values(&[("disk_usage", 90.0)]), at(0));
    assert_eq!(report.escalated.len(), 1);
    assert_eq!(sink.calls(), 1);
    assert_eq!(engine.escalated_issues().len(), 1);

    let report = engine.run_tick(values(&[("disk_usage", 40.0)]), at(1));
    assert_eq!(report.resolved.len(), 1);
}

#[test]
fn panicking_executor_does_not_break_the_tick() {
    let executor = ScriptedExecutor::always_succeed().with("cleanup_temp_files", Outcome::Panic);
    let mut engine = engine(executor);
    let report = engine.run_tick(values(&[("disk_usage", 90.0)]), at(0));

    assert_eq!(report.detected.len(), 1);
    assert!(report.escalated.is_empty());
    let history = engine.recovery_history(10);
    assert_eq!(history.len(), 2);
    assert!(!history[0].success);
    assert!(history[1].success);
    assert!(!engine.is_recovery_in_flight(&history[0].issue_id));
}

#[test]
fn replan_respects_backoff() {
    let mut engine = engine(ScriptedExecutor::always_fail());
    engine.run_tick(values(&[("disk_usage", 90.0)]), at(0));
    let id = engine.active_issues()[0].id.clone();

    match engine.replan_issue(&id, at(0) + Duration::seconds(60)) {
        Err(WardenError::ReplanBackoff { remaining_secs, .. }) => assert_eq!(remaining_secs, 240),
        other => panic!("expected ReplanBackoff, got {other:?}"),
    }

    let outcome = engine
        .replan_issue(&id, at(0) + Duration::seconds(301))
        .expect("replan after backoff");
    assert!(outcome.exhausted());
    assert_eq!(engine.recovery_history(100).len(), 8);
    let issue = &engine.active_issues()[0];
    assert_eq!(issue.resolution_actions.len(), 8);
    assert_eq!(issue.last_planned_at, Some(at(0) + Duration::seconds(301)));
}

#[test]
fn replan_unknown_issue_is_not_found() {
    let mut engine = engine(ScriptedExecutor::always_fail());
    assert!(matches!(
        engine.replan_issue("nope", at(0)),
        Err(WardenError::IssueNotFound { .. })
    ));
}

// ── Dismissal and history ─────────────────────────────────────────────────

#[test]
fn dismissal_moves_issue_to_history() {
    let mut engine = engine(ScriptedExecutor::always_fail());
    engine.run_tick(values(&[("disk_usage", 90.0)]), at(0));
    let id = engine.active_issues()[0].id.clone();

    let dismissed = engine.dismiss_issue(&id, at(1)).expect("dismiss");
    assert!(dismissed.dismissed);
    assert!(!dismissed.auto_resolved);
    assert_eq!(dismissed.resolved_at, Some(at(1)));
    assert!(engine.active_issues().is_empty());
    assert!(engine.escalated_issues().is_empty());
    assert_eq!(engine.resolved_issues(10)[0].id, id);

    assert!(matches!(
        engine.dismiss_issue(&id, at(2)),
        Err(WardenError::IssueNotFound { .. })
    ));

    // Condition still holds, so a fresh issue is raised on the next tick.
    let report = engine.run_tick(values(&[("disk_usage", 90.0)]), at(2));
    assert_eq!(report.detected.len(), 1);
    assert_ne!(report.detected[0], id);
}

#[test]
fn resolved_history_is_bounded() {
    let config = WardenConfig {
        history: HistoryConfig {
            resolved_capacity: 2,
            ..HistoryConfig::default()
        },
        ..WardenConfig::default()
    };
    let mut engine = HealingEngine::new(config, Arc::new(ScriptedExecutor::always_succeed()));
    for round in 0..4 {
        engine.run_tick(values(&[("disk_usage", 90.0)]), at(round * 2));
        engine.run_tick(values(&[("disk_usage", 40.0)]), at(round * 2 + 1));
    }
    let resolved = engine.resolved_issues(10);
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[1].resolved_at, Some(at(7)));
}

// ── Config and report ─────────────────────────────────────────────────────

#[test]
fn invalid_thresholds_are_repaired_with_a_warning() {
    let mut config = WardenConfig::default();
    config.thresholds.insert("disk_usage", Thresholds::new(99.0, 10.0));
    let engine = HealingEngine::new(config, Arc::new(ScriptedExecutor::always_succeed()));

    assert_eq!(engine.config_warnings().len(), 1);
    assert_eq!(
        engine.config().thresholds.get("disk_usage"),
        Some(Thresholds::new(85.0, 95.0))
    );
}

#[test]
fn health_report_summarizes_state() {
    let mut engine = engine(ScriptedExecutor::always_succeed());
    engine.run_tick(values(&[("disk_usage", 96.0), ("cpu_usage", 20.0)]), at(0));
    engine.run_tick(values(&[("disk_usage", 50.0), ("cpu_usage", 20.0)]), at(1));
    engine.run_tick(values(&[("disk_usage", 50.0), ("cpu_usage", 80.0)]), at(2));

    let report = engine.health_report(false, at(3));
    assert!(!report.is_monitoring);
    assert_eq!(report.overall_status, Status::Warning);
    assert_eq!(report.current_metrics.len(), 2);
    assert!(report.active_issues.is_empty());
    assert_eq!(report.resolved_last_24h, 1);
    assert_eq!(report.recovery.total_actions, 1);
    assert_eq!(report.recovery.successful_actions, 1);
    assert_eq!(report.recovery.recent_actions_24h, 1);

    let later = engine.health_report(true, at(0) + Duration::days(2));
    assert_eq!(later.resolved_last_24h, 0);
    assert_eq!(later.recovery.recent_actions_24h, 0);
}
