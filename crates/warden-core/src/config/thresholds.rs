use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;
use super::rules::ThresholdLevel;

/// Warning and critical levels for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Thresholds {
    pub fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }

    /// Both levels finite and `warning <= critical`.
    pub fn is_valid(&self) -> bool {
        self.warning.is_finite() && self.critical.is_finite() && self.warning <= self.critical
    }

    pub fn level(&self, level: ThresholdLevel) -> f64 {
        match level {
            ThresholdLevel::Warning => self.warning,
            ThresholdLevel::Critical => self.critical,
        }
    }
}

/// Threshold rows keyed by metric name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable(BTreeMap<String, Thresholds>);

impl ThresholdTable {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, metric: &str) -> Option<Thresholds> {
        self.0.get(metric).copied()
    }

    /// The value for `level` of `metric`, if the metric has a row.
    pub fn level(&self, metric: &str, level: ThresholdLevel) -> Option<f64> {
        self.get(metric).map(|t| t.level(level))
    }

    pub fn insert(&mut self, metric: impl Into<String>, thresholds: Thresholds) {
        self.0.insert(metric.into(), thresholds);
    }

    pub fn remove(&mut self, metric: &str) -> Option<Thresholds> {
        self.0.remove(metric)
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.0.contains_key(metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Thresholds)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `overrides` on top of this table.
    pub fn merged_with(mut self, overrides: ThresholdTable) -> Self {
        self.0.extend(overrides.0);
        self
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (metric, warning, critical) in defaults::DEFAULT_THRESHOLDS {
            table.insert(metric, Thresholds::new(warning, critical));
        }
        table
    }
}
