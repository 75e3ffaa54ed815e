//! Threshold classification of metric samples.

use warden_core::config::{ThresholdTable, Thresholds};
use warden_core::models::Status;

/// Classifies a sample against its metric's threshold row.
pub struct HealthEvaluator;

impl HealthEvaluator {
    /// `Critical` at or above the critical level, `Warning` at or above the
    /// warning level, otherwise `Healthy`. Metrics without a row are healthy.
    pub fn evaluate(name: &str, value: f64, thresholds: &ThresholdTable) -> Status {
        thresholds
            .get(name)
            .map_or(Status::Healthy, |row| Self::classify(value, row))
    }

    pub fn classify(value: f64, row: Thresholds) -> Status {
        if value >= row.critical {
            Status::Critical
        } else if value >= row.warning {
            Status::Warning
        } else {
            Status::Healthy
        }
    }
}
