//! Raw collection results handed from the sources to the engine.

use std::collections::HashMap;

use warden_core::errors::CollectionError;

/// What one source produced this tick.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: String,
    pub result: Result<HashMap<String, f64>, CollectionError>,
}

/// Every source's report for one tick, in source registration order.
#[derive(Debug, Clone, Default)]
pub struct CollectionBatch {
    reports: Vec<SourceReport>,
}

impl CollectionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch holding a single successful report.
    pub fn from_values<N: Into<String>>(
        source: impl Into<String>,
        values: impl IntoIterator<Item = (N, f64)>,
    ) -> Self {
        let mut batch = Self::new();
        batch.push(
            source,
            Ok(values.into_iter().map(|(n, v)| (n.into(), v)).collect()),
        );
        batch
    }

    pub fn push(
        &mut self,
        source: impl Into<String>,
        result: Result<HashMap<String, f64>, CollectionError>,
    ) {
        self.reports.push(SourceReport {
            source: source.into(),
            result,
        });
    }

    pub fn reports(&self) -> &[SourceReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

impl IntoIterator for CollectionBatch {
    type Item = SourceReport;
    type IntoIter = std::vec::IntoIter<SourceReport>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.into_iter()
    }
}
