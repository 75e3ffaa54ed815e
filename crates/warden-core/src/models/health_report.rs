use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Alert, Status, SystemIssue};

/// Point-in-time report over the controller's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub generated_at: DateTime<Utc>,
    pub is_monitoring: bool,
    pub overall_status: Status,
    pub current_metrics: Vec<MetricSummary>,
    pub active_issues: Vec<SystemIssue>,
    pub resolved_last_24h: usize,
    pub recovery: RecoverySummary,
    pub alerts: Vec<Alert>,
}

/// Latest sample of one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSummary {
    pub name: String,
    pub value: f64,
    pub status: Status,
    /// Warning threshold, if the metric has a threshold row.
    pub threshold: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoverySummary {
    pub total_actions: usize,
    pub successful_actions: usize,
    pub recent_actions_24h: usize,
}
