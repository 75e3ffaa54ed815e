// Single source of truth for all default values.

// --- Monitor ---
pub const DEFAULT_MONITORING_INTERVAL_SECS: u64 = 30;

// --- History ---
pub const DEFAULT_METRIC_CAPACITY: usize = 100;
pub const DEFAULT_RESOLVED_CAPACITY: usize = 1_000;
pub const DEFAULT_ACTION_CAPACITY: usize = 1_000;
pub const DEFAULT_DEGRADATION_CAPACITY: usize = 1_000;

// --- Recovery ---
pub const DEFAULT_REPLAN_BACKOFF_SECS: u64 = 300; // 5 minutes

// --- Thresholds (metric, warning, critical) ---
pub const DEFAULT_THRESHOLDS: [(&str, f64, f64); 7] = [
    ("cpu_usage", 75.0, 90.0),
    ("memory_usage", 80.0, 95.0),
    ("disk_usage", 85.0, 95.0),
    ("response_time", 1_000.0, 3_000.0),
    ("error_rate", 2.0, 5.0),
    ("connection_count", 8_000.0, 9_500.0),
    ("queue_depth", 500.0, 1_000.0),
];

// --- Detection ---
pub const DEFAULT_PERFORMANCE_WINDOW: usize = 5;
pub const DEFAULT_PERFORMANCE_RESOLUTION_WINDOW: usize = 3;
pub const DEFAULT_LEAK_TREND_WINDOW: usize = 10;
pub const DEFAULT_LEAK_MIN_SAMPLES: usize = 5;
pub const DEFAULT_LEAK_SLOPE: f64 = 2.0;
