//! # warden-observability
//!
//! Structured tracing with span definitions and named events, tracking of
//! metric collection fallbacks with alerting, and health report generation
//! over the controller's state.

pub mod degradation;
pub mod health;
pub mod tracing_setup;

pub use degradation::{evaluate_alerts, escalation_alerts, DegradationTracker};
pub use health::{HealthReporter, HealthSnapshot};
