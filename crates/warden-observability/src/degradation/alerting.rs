//! Alert thresholds: >3 fallbacks in 1 hour → warning, same metric degraded >24h → critical,
//! escalated issue → critical.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use warden_core::constants::{DEGRADED_CRITICAL_SECS, FALLBACK_ALERT_COUNT};
use warden_core::models::{Alert, AlertLevel, SystemIssue};

use super::tracker::DegradationTracker;

/// Evaluate collection alerts based on the current degradation tracker state.
pub fn evaluate_alerts(tracker: &DegradationTracker, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let mut seen_components = HashSet::new();

    for tracked in tracker.events() {
        let component = &tracked.event.component;
        if !seen_components.insert(component.clone()) {
            continue;
        }

        if let Some(duration) = tracker.degraded_duration(component, now) {
            if duration > chrono::Duration::seconds(DEGRADED_CRITICAL_SECS) {
                alerts.push(Alert {
                    level: AlertLevel::Critical,
                    subject: component.clone(),
                    message: format!("{} has been falling back for over 24 hours", component),
                });
                continue;
            }
        }

        let recent_count = tracker.count_recent(component, 3600, now);
        if recent_count > FALLBACK_ALERT_COUNT {
            alerts.push(Alert {
                level: AlertLevel::Warning,
                subject: component.clone(),
                message: format!(
                    "{} fell back {} times in the last hour",
                    component, recent_count
                ),
            });
        }
    }

    alerts
}

/// One critical alert per escalated active issue.
pub fn escalation_alerts<'a>(issues: impl IntoIterator<Item = &'a SystemIssue>) -> Vec<Alert> {
    issues
        .into_iter()
        .filter(|issue| issue.is_active() && issue.escalated)
        .map(|issue| Alert {
            level: AlertLevel::Critical,
            subject: issue.id.clone(),
            message: format!(
                "{} ({}) could not be recovered automatically: {}",
                issue.issue_type, issue.severity, issue.description
            ),
        })
        .collect()
}
