//! Bounded per-metric sample history.

use std::collections::{HashMap, VecDeque};

use warden_core::config::defaults::DEFAULT_METRIC_CAPACITY;
use warden_core::models::HealthMetric;

/// Least-squares slope of `values` against their index (units per sample).
///
/// Returns 0.0 for fewer than two values.
pub fn trend_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;
    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Ring buffer of recent samples per metric name, oldest evicted first.
#[derive(Debug, Clone)]
pub struct MetricHistory {
    buffers: HashMap<String, VecDeque<HealthMetric>>,
    capacity: usize,
}

impl MetricHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a sample, evicting the oldest one of that metric at capacity.
    pub fn record(&mut self, metric: HealthMetric) {
        let buffer = self
            .buffers
            .entry(metric.name.clone())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity.min(64)));
        buffer.push_back(metric);
        while buffer.len() > self.capacity {
            buffer.pop_front();
        }
    }

    pub fn latest(&self, name: &str) -> Option<&HealthMetric> {
        self.buffers.get(name).and_then(|b| b.back())
    }

    /// Up to `limit` most recent samples of `name`, oldest first.
    pub fn recent(&self, name: &str, limit: usize) -> Vec<HealthMetric> {
        self.buffers
            .get(name)
            .map(|b| b.iter().skip(b.len().saturating_sub(limit)).cloned().collect())
            .unwrap_or_default()
    }

    /// Values of the last `window` samples of `name`, oldest first.
    pub fn values(&self, name: &str, window: usize) -> Vec<f64> {
        self.buffers
            .get(name)
            .map(|b| {
                b.iter()
                    .skip(b.len().saturating_sub(window))
                    .map(|m| m.value)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Slope over the last `window` samples. 0.0 with fewer than two samples.
    pub fn trend(&self, name: &str, window: usize) -> f64 {
        trend_slope(&self.values(name, window))
    }

    /// Mean of the last `window` samples, or of all samples when fewer are held.
    pub fn rolling_average(&self, name: &str, window: usize) -> Option<f64> {
        let values = self.values(name, window);
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Number of samples held for `name`.
    pub fn len(&self, name: &str) -> usize {
        self.buffers.get(name).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.values().all(VecDeque::is_empty)
    }

    /// Every metric name with at least one sample, sorted.
    pub fn metric_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.buffers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The latest sample of every metric, sorted by name.
    pub fn latest_all(&self) -> Vec<HealthMetric> {
        self.metric_names()
            .into_iter()
            .filter_map(|name| self.latest(name).cloned())
            .collect()
    }
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new(DEFAULT_METRIC_CAPACITY)
    }
}
