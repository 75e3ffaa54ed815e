//! Declarative detection rules.
//!
//! A rule names a metric, the condition that raises an issue, and the
//! condition under which that issue counts as resolved. Threshold levels are
//! resolved against the metric's row in the threshold table at evaluation time.

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::IssueType;

/// Which threshold of a metric's row a condition compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdLevel {
    Warning,
    Critical,
}

/// Condition that raises an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// Mean of the last `window` samples is above the threshold.
    RollingAverageAbove { window: usize, level: ThresholdLevel },
    /// At least `min_samples` samples, slope over the last `window` above
    /// `slope`, and the current value above the threshold.
    TrendAbove {
        window: usize,
        min_samples: usize,
        slope: f64,
        level: ThresholdLevel,
    },
    /// Latest sample is above the threshold.
    CurrentAbove { level: ThresholdLevel },
}

/// Condition under which an issue raised by the rule is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionCondition {
    /// Mean of the last `window` samples is below the threshold.
    RollingAverageBelow { window: usize, level: ThresholdLevel },
    /// Latest sample is below the threshold.
    CurrentBelow { level: ThresholdLevel },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRule {
    pub metric: String,
    pub issue_type: IssueType,
    /// Human-readable prefix for issue descriptions.
    pub label: String,
    pub trigger: Trigger,
    pub resolution: ResolutionCondition,
    #[serde(default)]
    pub affected_components: Vec<String>,
}

impl ThresholdLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl Trigger {
    /// Sample window the trigger reads, used for validation.
    pub fn window(&self) -> usize {
        match self {
            Self::RollingAverageAbove { window, .. } | Self::TrendAbove { window, .. } => *window,
            Self::CurrentAbove { .. } => 1,
        }
    }
}

impl ResolutionCondition {
    pub fn window(&self) -> usize {
        match self {
            Self::RollingAverageBelow { window, .. } => *window,
            Self::CurrentBelow { .. } => 1,
        }
    }
}

/// The four rules the controller ships with.
pub fn default_rules() -> Vec<DetectionRule> {
    vec![
        DetectionRule {
            metric: "response_time".into(),
            issue_type: IssueType::PerformanceDegradation,
            label: "Severe performance degradation".into(),
            trigger: Trigger::RollingAverageAbove {
                window: defaults::DEFAULT_PERFORMANCE_WINDOW,
                level: ThresholdLevel::Critical,
            },
            resolution: ResolutionCondition::RollingAverageBelow {
                window: defaults::DEFAULT_PERFORMANCE_RESOLUTION_WINDOW,
                level: ThresholdLevel::Warning,
            },
            affected_components: vec!["email_server".into(), "database".into(), "network".into()],
        },
        DetectionRule {
            metric: "memory_usage".into(),
            issue_type: IssueType::MemoryLeak,
            label: "Memory leak".into(),
            trigger: Trigger::TrendAbove {
                window: defaults::DEFAULT_LEAK_TREND_WINDOW,
                min_samples: defaults::DEFAULT_LEAK_MIN_SAMPLES,
                slope: defaults::DEFAULT_LEAK_SLOPE,
                level: ThresholdLevel::Warning,
            },
            resolution: ResolutionCondition::CurrentBelow {
                level: ThresholdLevel::Warning,
            },
            affected_components: vec!["email_server".into(), "cache_system".into()],
        },
        DetectionRule {
            metric: "disk_usage".into(),
            issue_type: IssueType::DiskSpaceLow,
            label: "Low disk space".into(),
            trigger: Trigger::CurrentAbove {
                level: ThresholdLevel::Warning,
            },
            resolution: ResolutionCondition::CurrentBelow {
                level: ThresholdLevel::Warning,
            },
            affected_components: vec!["storage_system".into(), "log_system".into()],
        },
        DetectionRule {
            metric: "error_rate".into(),
            issue_type: IssueType::ServiceUnresponsive,
            label: "Service unresponsive".into(),
            trigger: Trigger::CurrentAbove {
                level: ThresholdLevel::Critical,
            },
            resolution: ResolutionCondition::CurrentBelow {
                level: ThresholdLevel::Warning,
            },
            affected_components: vec![
                "email_server".into(),
                "authentication_service".into(),
            ],
        },
    ]
}
