//! Aggregate health report generation.

use chrono::{DateTime, Utc};
use warden_core::config::ThresholdTable;
use warden_core::constants::REPORT_RECENT_WINDOW_HOURS;
use warden_core::errors::WardenResult;
use warden_core::models::{
    Alert, HealthMetric, HealthReport, MetricSummary, RecoveryAction, RecoverySummary, Status,
    SystemIssue,
};

/// Copy of controller state used to build a health report.
#[derive(Debug, Clone, Default)]
pub struct HealthSnapshot {
    pub is_monitoring: bool,
    /// Latest sample of each metric.
    pub latest_metrics: Vec<HealthMetric>,
    pub thresholds: ThresholdTable,
    pub active_issues: Vec<SystemIssue>,
    pub resolved_issues: Vec<SystemIssue>,
    pub recovery_actions: Vec<RecoveryAction>,
    pub alerts: Vec<Alert>,
}

/// Builds a [`HealthReport`] from a snapshot.
pub struct HealthReporter;

impl HealthReporter {
    /// Generate a full health report from the given snapshot.
    pub fn build(snapshot: HealthSnapshot, now: DateTime<Utc>) -> HealthReport {
        let cutoff = now - chrono::Duration::hours(REPORT_RECENT_WINDOW_HOURS);

        let current_metrics: Vec<MetricSummary> = snapshot
            .latest_metrics
            .iter()
            .map(|m| MetricSummary {
                name: m.name.clone(),
                value: m.value,
                status: m.status,
                threshold: snapshot.thresholds.get(&m.name).map(|t| t.warning),
                last_updated: m.timestamp,
            })
            .collect();

        let overall_status = Self::derive_overall(&current_metrics, &snapshot.active_issues);

        let resolved_last_24h = snapshot
            .resolved_issues
            .iter()
            .filter(|i| i.resolved_at.is_some_and(|at| at > cutoff))
            .count();

        let recovery = RecoverySummary {
            total_actions: snapshot.recovery_actions.len(),
            successful_actions: snapshot.recovery_actions.iter().filter(|a| a.success).count(),
            recent_actions_24h: snapshot
                .recovery_actions
                .iter()
                .filter(|a| a.executed_at > cutoff)
                .count(),
        };

        HealthReport {
            generated_at: now,
            is_monitoring: snapshot.is_monitoring,
            overall_status,
            current_metrics,
            active_issues: snapshot.active_issues,
            resolved_last_24h,
            recovery,
            alerts: snapshot.alerts,
        }
    }

    /// Serialize a report as pretty JSON.
    pub fn to_json(report: &HealthReport) -> WardenResult<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Worst of the current metric statuses and active issue severities.
    fn derive_overall(metrics: &[MetricSummary], active_issues: &[SystemIssue]) -> Status {
        Status::worst(
            metrics
                .iter()
                .map(|m| m.status)
                .chain(active_issues.iter().map(|i| i.severity)),
        )
    }
}
