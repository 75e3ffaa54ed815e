use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Tick timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interval between ticks (seconds).
    pub interval_secs: u64,
    /// Per-source collection timeout (seconds). Defaults to the interval.
    pub collection_timeout_secs: Option<u64>,
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn collection_timeout(&self) -> Duration {
        Duration::from_secs(self.collection_timeout_secs.unwrap_or(self.interval_secs))
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::DEFAULT_MONITORING_INTERVAL_SECS,
            collection_timeout_secs: None,
        }
    }
}
