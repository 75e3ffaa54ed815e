use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Status;

/// One recorded metric sample. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    pub name: String,
    pub value: f64,
    pub status: Status,
    pub timestamp: DateTime<Utc>,
    /// True when the sample is the last known value standing in for a failed collection.
    #[serde(default)]
    pub fallback: bool,
}

impl HealthMetric {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        status: Status,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            status,
            timestamp,
            fallback: false,
        }
    }

    /// Mark this sample as a collection fallback.
    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}
