/// Metric collection errors. Always recovered locally with a fallback sample.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectionError {
    #[error("source {source_name} failed: {reason}")]
    SourceFailed { source_name: String, reason: String },

    #[error("source {source_name} timed out after {timeout_ms} ms")]
    Timeout { source_name: String, timeout_ms: u64 },

    #[error("source {source_name} panicked during collection")]
    Panicked { source_name: String },

    #[error("metric {metric} reported a non-finite value")]
    NonFinite { metric: String },

    #[error("metric {metric} missing from source {source_name}")]
    Missing { metric: String, source_name: String },
}

impl CollectionError {
    /// Short machine-friendly label used in degradation events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceFailed { .. } => "source_failed",
            Self::Timeout { .. } => "timeout",
            Self::Panicked { .. } => "panicked",
            Self::NonFinite { .. } => "non_finite",
            Self::Missing { .. } => "missing",
        }
    }
}
