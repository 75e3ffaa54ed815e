pub mod defaults;
mod history_config;
mod monitor_config;
mod recovery_config;
pub mod rules;
mod thresholds;

pub use history_config::HistoryConfig;
pub use monitor_config::MonitorConfig;
pub use recovery_config::{RecoveryConfig, StrategyTable};
pub use rules::{default_rules, DetectionRule, ResolutionCondition, ThresholdLevel, Trigger};
pub use thresholds::{ThresholdTable, Thresholds};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Top-level controller configuration.
///
/// Every section falls back to its defaults when absent. Threshold rows and
/// strategy lists given in TOML are merged over the defaults; `rules`, when
/// given, replaces the default rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub monitor: MonitorConfig,
    pub history: HistoryConfig,
    pub recovery: RecoveryConfig,
    pub thresholds: ThresholdTable,
    pub strategies: StrategyTable,
    pub rules: Vec<DetectionRule>,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            history: HistoryConfig::default(),
            recovery: RecoveryConfig::default(),
            thresholds: ThresholdTable::default(),
            strategies: StrategyTable::default(),
            rules: default_rules(),
        }
    }
}

impl WardenConfig {
    /// Parse a TOML document, merging threshold and strategy tables over the defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let parsed: WardenConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::ParseFailed {
                reason: e.to_string(),
            })?;
        Ok(Self {
            thresholds: ThresholdTable::default().merged_with(parsed.thresholds),
            strategies: StrategyTable::default().merged_with(parsed.strategies),
            ..parsed
        })
    }

    /// Repair invalid values in place of rejecting them.
    ///
    /// Invalid threshold rows fall back to the default row for that metric,
    /// or are dropped when there is none. Zero capacities and intervals take
    /// their defaults. Rules with a zero window are dropped. Every repair is
    /// returned so the caller can surface it as a startup warning.
    pub fn repaired(mut self) -> (Self, Vec<ConfigError>) {
        let mut problems = Vec::new();
        let default_thresholds = ThresholdTable::default();

        let invalid: Vec<(String, Thresholds)> = self
            .thresholds
            .iter()
            .filter(|(_, t)| !t.is_valid())
            .map(|(name, t)| (name.clone(), *t))
            .collect();
        for (metric, bad) in invalid {
            problems.push(ConfigError::InvalidThresholds {
                metric: metric.clone(),
                warning: bad.warning,
                critical: bad.critical,
            });
            match default_thresholds.get(&metric) {
                Some(fallback) => self.thresholds.insert(metric, fallback),
                None => {
                    self.thresholds.remove(&metric);
                }
            }
        }

        if self.monitor.interval_secs == 0 {
            problems.push(zero_value("monitor.interval_secs"));
            self.monitor.interval_secs = defaults::DEFAULT_MONITORING_INTERVAL_SECS;
        }
        if self.monitor.collection_timeout_secs == Some(0) {
            problems.push(zero_value("monitor.collection_timeout_secs"));
            self.monitor.collection_timeout_secs = None;
        }

        let capacities = [
            (
                "history.metric_capacity",
                &mut self.history.metric_capacity,
                defaults::DEFAULT_METRIC_CAPACITY,
            ),
            (
                "history.resolved_capacity",
                &mut self.history.resolved_capacity,
                defaults::DEFAULT_RESOLVED_CAPACITY,
            ),
            (
                "history.action_capacity",
                &mut self.history.action_capacity,
                defaults::DEFAULT_ACTION_CAPACITY,
            ),
            (
                "history.degradation_capacity",
                &mut self.history.degradation_capacity,
                defaults::DEFAULT_DEGRADATION_CAPACITY,
            ),
        ];
        for (field, value, default) in capacities {
            if *value == 0 {
                problems.push(zero_value(field));
                *value = default;
            }
        }

        self.rules.retain(|rule| {
            let ok = rule.trigger.window() > 0 && rule.resolution.window() > 0;
            if !ok {
                problems.push(ConfigError::InvalidValue {
                    field: format!("rules.{}", rule.issue_type),
                    reason: "window must be at least 1".into(),
                });
            }
            ok
        });

        (self, problems)
    }
}

fn zero_value(field: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: "must be greater than zero".into(),
    }
}
