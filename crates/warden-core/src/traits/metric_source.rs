use std::collections::HashMap;

use crate::errors::CollectionError;

/// Supplies raw metric values once per tick.
///
/// Implementations may block; the control loop runs each source on a
/// blocking thread under a per-call timeout.
pub trait IMetricSource: Send + Sync {
    /// Stable name used in logs and degradation events.
    fn name(&self) -> &str;

    /// Sample every metric this source knows about.
    fn collect(&self) -> Result<HashMap<String, f64>, CollectionError>;
}
