//! Structured log events for the controller's lifecycle.
//!
//! Each function emits a `tracing` event with structured fields.

use warden_core::models::{IssueType, Status};

/// Log a newly detected issue.
pub fn issue_detected(issue_id: &str, issue_type: &IssueType, severity: Status, observed: f64) {
    tracing::warn!(
        event = "issue_detected",
        issue_id = %issue_id,
        issue_type = %issue_type,
        severity = %severity,
        observed = observed,
        "issue detected"
    );
}

/// Log one recovery strategy attempt.
pub fn recovery_attempted(issue_id: &str, strategy: &str, success: bool, error: Option<&str>) {
    if success {
        tracing::info!(
            event = "recovery_attempted",
            issue_id = %issue_id,
            strategy = %strategy,
            success = true,
            "recovery action succeeded"
        );
    } else {
        tracing::warn!(
            event = "recovery_attempted",
            issue_id = %issue_id,
            strategy = %strategy,
            success = false,
            error = error.unwrap_or("reported failure"),
            "recovery action failed"
        );
    }
}

/// Log an issue verified as resolved.
pub fn issue_resolved(issue_id: &str, issue_type: &IssueType) {
    tracing::info!(
        event = "issue_resolved",
        issue_id = %issue_id,
        issue_type = %issue_type,
        "issue verified as resolved"
    );
}

/// Log an issue whose every recovery strategy failed.
pub fn issue_escalated(issue_id: &str, issue_type: &IssueType, attempts: usize) {
    tracing::error!(
        event = "issue_escalated",
        issue_id = %issue_id,
        issue_type = %issue_type,
        attempts = attempts,
        "recovery strategies exhausted, escalating"
    );
}

/// Log an escalation sink that panicked while receiving an issue.
pub fn escalation_panicked(issue_id: &str, issue_type: &IssueType) {
    tracing::error!(
        event = "escalation_panicked",
        issue_id = %issue_id,
        issue_type = %issue_type,
        "escalation sink panicked, issue stays escalated"
    );
}

/// Log an issue closed by a caller.
pub fn issue_dismissed(issue_id: &str, issue_type: &IssueType) {
    tracing::info!(
        event = "issue_dismissed",
        issue_id = %issue_id,
        issue_type = %issue_type,
        "issue dismissed"
    );
}

/// Log a metric falling back after a collection failure.
pub fn metric_fallback(metric: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "metric_fallback",
        metric = %metric,
        failure = %failure,
        fallback = %fallback,
        "metric collection failed, using fallback"
    );
}

/// Log a configuration value that was repaired at startup.
pub fn config_repaired(problem: &str) {
    tracing::warn!(
        event = "config_repaired",
        problem = %problem,
        "invalid configuration replaced with default"
    );
}

/// Log a control-loop state transition.
pub fn loop_state_changed(from: &str, to: &str) {
    tracing::info!(
        event = "loop_state_changed",
        from = %from,
        to = %to,
        "control loop state changed"
    );
}

/// Log the outcome of one tick.
pub fn tick_completed(samples: usize, fallbacks: usize, detected: usize, resolved: usize) {
    tracing::debug!(
        event = "tick_completed",
        samples = samples,
        fallbacks = fallbacks,
        detected = detected,
        resolved = resolved,
        "tick completed"
    );
}
