//! Health report generation over the controller's state.

pub mod reporter;

pub use reporter::{HealthReporter, HealthSnapshot};
