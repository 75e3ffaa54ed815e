use std::sync::Arc;
use std::time::Duration;

use test_fixtures::{PanickingEscalation, RecordingEscalation, ScriptedExecutor, ScriptedSource};
use warden_core::config::{MonitorConfig, WardenConfig};
use warden_core::errors::WardenError;
use warden_core::models::IssueType;
use warden_healing::{ControlLoop, LoopState};

fn config(interval_secs: u64, timeout_secs: Option<u64>) -> WardenConfig {
    WardenConfig {
        monitor: MonitorConfig {
            interval_secs,
            collection_timeout_secs: timeout_secs,
        },
        ..WardenConfig::default()
    }
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 2s");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn manual_tick_runs_the_whole_pipeline() {
    let source = Arc::new(ScriptedSource::from_series("host", "disk_usage", &[96.0, 40.0]));
    let control = ControlLoop::builder(
        WardenConfig::default(),
        Arc::new(ScriptedExecutor::always_succeed()),
    )
    .source(source.clone())
    .build();

    let report = control.tick().await.expect("tick");
    assert_eq!(report.tick, 1);
    assert_eq!(report.detected.len(), 1);
    let active = control.active_issues().expect("active");
    assert_eq!(active[0].issue_type, IssueType::DiskSpaceLow);
    assert!(!control.is_recovery_in_flight(&active[0].id));

    let report = control.tick().await.expect("tick");
    assert_eq!(report.resolved, vec![active[0].id.clone()]);
    assert!(control.active_issues().expect("active").is_empty());
    assert_eq!(control.resolved_issues(10).expect("resolved").len(), 1);
    assert_eq!(control.recent_metrics("disk_usage", 10).expect("metrics").len(), 2);
    assert_eq!(source.calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sources_are_collected_independently() {
    let healthy = Arc::new(ScriptedSource::from_series("disk", "disk_usage", &[50.0, 51.0]));
    let flaky = Arc::new(
        ScriptedSource::new("cpu")
            .then_values([("cpu_usage", 30.0)])
            .then_panic(),
    );
    let control = ControlLoop::builder(
        WardenConfig::default(),
        Arc::new(ScriptedExecutor::always_succeed()),
    )
    .source(healthy)
    .source(flaky)
    .build();

    control.tick().await.expect("first tick");
    let report = control.tick().await.expect("second tick");

    assert_eq!(report.samples, 2);
    assert_eq!(report.fallbacks, 1);
    let cpu = control.recent_metrics("cpu_usage", 1).expect("cpu");
    assert!(cpu[0].fallback);
    assert_eq!(cpu[0].value, 30.0);
    let disk = control.recent_metrics("disk_usage", 1).expect("disk");
    assert_eq!(disk[0].value, 51.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_source_times_out_and_falls_back() {
    let source = Arc::new(
        ScriptedSource::new("host")
            .then_values([("memory_usage", 55.0)])
            .then_hang(Duration::from_millis(1500)),
    );
    let control = ControlLoop::builder(
        config(30, Some(1)),
        Arc::new(ScriptedExecutor::always_succeed()),
    )
    .source(source)
    .build();

    control.tick().await.expect("first tick");
    let started = std::time::Instant::now();
    let report = control.tick().await.expect("second tick");

    assert!(started.elapsed() < Duration::from_millis(1400));
    assert_eq!(report.fallbacks, 1);
    let memory = control.recent_metrics("memory_usage", 1).expect("memory");
    assert!(memory[0].fallback);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn hung_source_is_not_called_again_while_its_call_is_running() {
    let source = Arc::new(
        ScriptedSource::new("host")
            .then_values([("memory_usage", 55.0)])
            .then_hang(Duration::from_millis(2500)),
    );
    let control = ControlLoop::builder(
        config(30, Some(1)),
        Arc::new(ScriptedExecutor::always_succeed()),
    )
    .source(source.clone())
    .build();

    control.tick().await.expect("first tick");
    control.tick().await.expect("tick that times out");
    assert_eq!(source.calls(), 2);

    for _ in 0..3 {
        let started = std::time::Instant::now();
        let report = control.tick().await.expect("tick while hung");
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(report.fallbacks, 1);
    }
    assert_eq!(source.calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_escalation_sink_does_not_stop_the_loop() {
    let sink = Arc::new(PanickingEscalation::new());
    let source = Arc::new(ScriptedSource::from_series("host", "error_rate", &[9.0, 9.0]));
    let control = ControlLoop::builder(
        WardenConfig::default(),
        Arc::new(ScriptedExecutor::always_fail()),
    )
    .escalation(sink.clone())
    .source(source)
    .build();

    let report = control.tick().await.expect("tick with escalation");
    assert_eq!(report.escalated.len(), 1);
    assert_eq!(sink.calls(), 1);
    assert_eq!(control.escalated_issues().expect("escalated").len(), 1);

    let report = control.tick().await.expect("next tick");
    assert_eq!(report.tick, 2);
    assert_eq!(control.active_issues().expect("active").len(), 1);
    assert_eq!(sink.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn start_stop_follows_the_state_machine() {
    let source = Arc::new(ScriptedSource::from_series("host", "cpu_usage", &[10.0]));
    let control = ControlLoop::builder(
        config(1, None),
        Arc::new(ScriptedExecutor::always_succeed()),
    )
    .source(source.clone())
    .build();

    assert_eq!(control.loop_state(), LoopState::Idle);
    assert!(matches!(control.stop(), Err(WardenError::NotRunning)));

    control.start().expect("start");
    assert_eq!(control.loop_state(), LoopState::Running);
    assert!(matches!(control.start(), Err(WardenError::AlreadyRunning)));

    // The first interval tick fires immediately.
    wait_for(|| source.calls() >= 1).await;
    assert!(control.health_report().expect("report").is_monitoring);

    control.shutdown().await.expect("shutdown");
    assert_eq!(control.loop_state(), LoopState::Idle);
    assert!(!control.health_report().expect("report").is_monitoring);

    let calls = source.calls();
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(source.calls(), calls);

    // Can be started again after returning to idle.
    control.start().expect("restart");
    control.shutdown().await.expect("second shutdown");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_is_observed_during_the_inter_tick_sleep() {
    let source = Arc::new(ScriptedSource::from_series("host", "cpu_usage", &[10.0]));
    let control = ControlLoop::builder(
        config(3600, None),
        Arc::new(ScriptedExecutor::always_succeed()),
    )
    .source(source.clone())
    .build();

    control.start().expect("start");
    wait_for(|| source.calls() >= 1).await;

    control.stop().expect("stop");
    wait_for(|| control.loop_state() == LoopState::Idle).await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn escalation_and_mutators_through_the_loop() {
    let sink = Arc::new(RecordingEscalation::new());
    let source = Arc::new(ScriptedSource::from_series("host", "error_rate", &[9.0]));
    let control = ControlLoop::builder(
        WardenConfig::default(),
        Arc::new(ScriptedExecutor::always_fail()),
    )
    .escalation(sink.clone())
    .source(source)
    .build();

    control.tick().await.expect("tick");
    let escalated = control.escalated_issues().expect("escalated");
    assert_eq!(escalated.len(), 1);
    assert_eq!(escalated[0].issue_type, IssueType::ServiceUnresponsive);
    assert_eq!(sink.escalated().len(), 1);
    assert!(!control.alerts().expect("alerts").is_empty());
    assert_eq!(control.recovery_history(100).expect("history").len(), 4);

    let id = escalated[0].id.clone();
    assert!(matches!(
        control.replan_issue(&id).await,
        Err(WardenError::ReplanBackoff { .. })
    ));

    let dismissed = control.dismiss_issue(&id).expect("dismiss");
    assert!(dismissed.dismissed);
    assert!(control.active_issues().expect("active").is_empty());
    assert!(matches!(
        control.replan_issue(&id).await,
        Err(WardenError::IssueNotFound { .. })
    ));
}
