/// Warden version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name recorded as `fallback_used` when a metric falls back to its last known value.
pub const FALLBACK_LAST_KNOWN: &str = "last_known_value";

/// Look-back window for the "recent" counters in the health report.
pub const REPORT_RECENT_WINDOW_HOURS: i64 = 24;

/// Fallbacks per metric within one hour before a warning alert is raised.
pub const FALLBACK_ALERT_COUNT: usize = 3;

/// Seconds a metric may stay degraded before a critical alert is raised.
pub const DEGRADED_CRITICAL_SECS: i64 = 24 * 3600;
