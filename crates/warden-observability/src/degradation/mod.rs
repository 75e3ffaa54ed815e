//! Collection degradation tracking and alerting.

pub mod alerting;
pub mod tracker;

pub use alerting::{escalation_alerts, evaluate_alerts};
pub use tracker::{DegradationTracker, RecoveryStatus, TrackedDegradation};
