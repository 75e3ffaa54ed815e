use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{IssueType, Status};

/// A detected degradation tracked from detection through resolution.
///
/// Active while `resolved_at` is `None`. Once resolved or dismissed it is
/// moved to history and never mutated again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemIssue {
    pub id: String,
    pub issue_type: IssueType,
    pub severity: Status,
    pub description: String,
    pub affected_components: BTreeSet<String>,
    /// Metric whose rule raised the issue.
    pub metric: String,
    /// Value that tripped the rule (rolling average or current sample).
    pub observed_value: f64,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Ids of every recovery action attempted for this issue, in order.
    pub resolution_actions: Vec<String>,
    pub auto_resolved: bool,
    /// Every recovery strategy failed in the last planning round.
    pub escalated: bool,
    /// Closed by a caller rather than by verification.
    pub dismissed: bool,
    pub last_planned_at: Option<DateTime<Utc>>,
}

impl SystemIssue {
    /// Create a new active issue with a fresh unique id.
    pub fn new(
        issue_type: IssueType,
        severity: Status,
        description: impl Into<String>,
        metric: impl Into<String>,
        observed_value: f64,
        affected_components: impl IntoIterator<Item = impl Into<String>>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("{}-{}", issue_type.as_str(), uuid::Uuid::new_v4()),
            issue_type,
            severity,
            description: description.into(),
            affected_components: affected_components.into_iter().map(Into::into).collect(),
            metric: metric.into(),
            observed_value,
            detected_at,
            resolved_at: None,
            resolution_actions: Vec::new(),
            auto_resolved: false,
            escalated: false,
            dismissed: false,
            last_planned_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.resolved_at.is_none()
    }

    /// Close the issue as verified-resolved.
    pub fn resolve(&mut self, at: DateTime<Utc>) {
        self.resolved_at = Some(at);
        self.auto_resolved = true;
    }

    /// Close the issue on a caller's request.
    pub fn dismiss(&mut self, at: DateTime<Utc>) {
        self.resolved_at = Some(at);
        self.dismissed = true;
    }
}
