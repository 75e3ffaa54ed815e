//! Rule-driven issue detection.
//!
//! Each [`DetectionRule`] is evaluated against the metric history and the
//! threshold table. A rule only raises an issue when no unresolved issue of
//! the same type is already active, so a sustained condition yields exactly
//! one issue no matter how many ticks it persists.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use warden_core::config::{DetectionRule, ThresholdTable, Trigger};
use warden_core::models::{IssueType, Status, SystemIssue};

use crate::history::MetricHistory;

/// What a rule saw when it fired.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Observation {
    /// Rolling average for averaging rules, the latest sample otherwise.
    observed: f64,
    threshold: f64,
    slope: Option<f64>,
}

/// Evaluates detection rules in order.
#[derive(Debug, Clone)]
pub struct IssueDetector {
    rules: Vec<DetectionRule>,
}

impl IssueDetector {
    pub fn new(rules: Vec<DetectionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DetectionRule] {
        &self.rules
    }

    /// Run every rule and return the issues that are new this tick.
    ///
    /// `is_active` reports whether an unresolved issue of a type exists.
    /// Rules sharing an issue type fire at most once per tick between them.
    pub fn detect(
        &self,
        history: &MetricHistory,
        thresholds: &ThresholdTable,
        is_active: impl Fn(&IssueType) -> bool,
        now: DateTime<Utc>,
    ) -> Vec<SystemIssue> {
        let mut raised: HashSet<IssueType> = HashSet::new();
        let mut issues = Vec::new();

        for rule in &self.rules {
            if is_active(&rule.issue_type) || raised.contains(&rule.issue_type) {
                continue;
            }
            let Some(observation) = Self::evaluate_rule(rule, history, thresholds) else {
                continue;
            };

            let critical = thresholds.get(&rule.metric).map(|t| t.critical);
            let severity = match critical {
                Some(level) if observation.observed > level => Status::Critical,
                _ => Status::Warning,
            };

            raised.insert(rule.issue_type.clone());
            issues.push(SystemIssue::new(
                rule.issue_type.clone(),
                severity,
                Self::describe(rule, &observation),
                rule.metric.clone(),
                observation.observed,
                rule.affected_components.iter().cloned(),
                now,
            ));
        }

        issues
    }

    /// Whether `rule` fires against the current history.
    pub fn fires(rule: &DetectionRule, history: &MetricHistory, thresholds: &ThresholdTable) -> bool {
        Self::evaluate_rule(rule, history, thresholds).is_some()
    }

    fn evaluate_rule(
        rule: &DetectionRule,
        history: &MetricHistory,
        thresholds: &ThresholdTable,
    ) -> Option<Observation> {
        match &rule.trigger {
            Trigger::RollingAverageAbove { window, level } => {
                let threshold = thresholds.level(&rule.metric, *level)?;
                let average = history.rolling_average(&rule.metric, *window)?;
                (average > threshold).then_some(Observation {
                    observed: average,
                    threshold,
                    slope: None,
                })
            }
            Trigger::TrendAbove {
                window,
                min_samples,
                slope,
                level,
            } => {
                let threshold = thresholds.level(&rule.metric, *level)?;
                if history.len(&rule.metric) < (*min_samples).max(2) {
                    return None;
                }
                let current = history.latest(&rule.metric)?.value;
                let trend = history.trend(&rule.metric, *window);
                (trend > *slope && current > threshold).then_some(Observation {
                    observed: current,
                    threshold,
                    slope: Some(trend),
                })
            }
            Trigger::CurrentAbove { level } => {
                let threshold = thresholds.level(&rule.metric, *level)?;
                let current = history.latest(&rule.metric)?.value;
                (current > threshold).then_some(Observation {
                    observed: current,
                    threshold,
                    slope: None,
                })
            }
        }
    }

    fn describe(rule: &DetectionRule, observation: &Observation) -> String {
        match (&rule.trigger, observation.slope) {
            (Trigger::RollingAverageAbove { window, level }, _) => format!(
                "{}: {} averaged {:.1} over the last {} samples ({} threshold {:.1})",
                rule.label,
                rule.metric,
                observation.observed,
                window,
                level.as_str(),
                observation.threshold
            ),
            (Trigger::TrendAbove { level, .. }, Some(slope)) => format!(
                "{}: {} at {:.1} and rising {:.2} per sample ({} threshold {:.1})",
                rule.label,
                rule.metric,
                observation.observed,
                slope,
                level.as_str(),
                observation.threshold
            ),
            (Trigger::TrendAbove { level, .. }, None) | (Trigger::CurrentAbove { level }, _) => {
                format!(
                    "{}: {} at {:.1} ({} threshold {:.1})",
                    rule.label,
                    rule.metric,
                    observation.observed,
                    level.as_str(),
                    observation.threshold
                )
            }
        }
    }
}
