use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SystemIssue;

/// Record of one recovery strategy attempt. Created once per attempt, immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryAction {
    pub id: String,
    /// Strategy name.
    pub action_type: String,
    pub issue_id: String,
    pub target_components: Vec<String>,
    pub executed_at: DateTime<Utc>,
    pub success: bool,
    pub error: Option<String>,
}

impl RecoveryAction {
    pub fn new(
        strategy: impl Into<String>,
        issue: &SystemIssue,
        executed_at: DateTime<Utc>,
        success: bool,
        error: Option<String>,
    ) -> Self {
        let strategy = strategy.into();
        Self {
            id: format!("{}-{}", strategy, uuid::Uuid::new_v4()),
            action_type: strategy,
            issue_id: issue.id.clone(),
            target_components: issue.affected_components.iter().cloned().collect(),
            executed_at,
            success,
            error,
        }
    }
}
