//! Resolution checks for active issues.

use std::collections::HashMap;

use warden_core::config::{DetectionRule, ResolutionCondition, ThresholdTable};
use warden_core::models::{IssueType, SystemIssue};

use crate::history::MetricHistory;

/// Decides whether an active issue's metric has recovered.
///
/// Conditions are taken from the detection rules, keyed by issue type and
/// metric so an issue is always checked against the rule that raised it.
#[derive(Debug, Clone, Default)]
pub struct ResolutionVerifier {
    conditions: HashMap<(IssueType, String), ResolutionCondition>,
}

impl ResolutionVerifier {
    pub fn from_rules(rules: &[DetectionRule]) -> Self {
        let mut conditions = HashMap::new();
        for rule in rules {
            conditions
                .entry((rule.issue_type.clone(), rule.metric.clone()))
                .or_insert_with(|| rule.resolution.clone());
        }
        Self { conditions }
    }

    /// True when the issue's resolution condition holds.
    ///
    /// False when there are no samples, no threshold row, or no condition
    /// for the issue.
    pub fn verify(
        &self,
        issue: &SystemIssue,
        history: &MetricHistory,
        thresholds: &ThresholdTable,
    ) -> bool {
        let key = (issue.issue_type.clone(), issue.metric.clone());
        let Some(condition) = self.conditions.get(&key) else {
            return false;
        };

        match condition {
            ResolutionCondition::RollingAverageBelow { window, level } => {
                match (
                    thresholds.level(&issue.metric, *level),
                    history.rolling_average(&issue.metric, *window),
                ) {
                    (Some(threshold), Some(average)) => average < threshold,
                    _ => false,
                }
            }
            ResolutionCondition::CurrentBelow { level } => {
                match (
                    thresholds.level(&issue.metric, *level),
                    history.latest(&issue.metric),
                ) {
                    (Some(threshold), Some(latest)) => latest.value < threshold,
                    _ => false,
                }
            }
        }
    }
}
