use serde::{Deserialize, Serialize};

use super::defaults;

/// Capacities of the bounded histories kept by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Samples retained per metric.
    pub metric_capacity: usize,
    /// Resolved issues retained.
    pub resolved_capacity: usize,
    /// Recovery actions retained.
    pub action_capacity: usize,
    /// Collection fallback events retained.
    pub degradation_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            metric_capacity: defaults::DEFAULT_METRIC_CAPACITY,
            resolved_capacity: defaults::DEFAULT_RESOLVED_CAPACITY,
            action_capacity: defaults::DEFAULT_ACTION_CAPACITY,
            degradation_capacity: defaults::DEFAULT_DEGRADATION_CAPACITY,
        }
    }
}
