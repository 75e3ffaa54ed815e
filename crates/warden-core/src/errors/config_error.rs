/// Configuration errors.
///
/// Parse failures are returned to the caller. Invalid values found after
/// parsing are repaired and reported as warnings instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {reason}")]
    ParseFailed { reason: String },

    #[error("invalid thresholds for {metric}: warning {warning}, critical {critical}")]
    InvalidThresholds {
        metric: String,
        warning: f64,
        critical: f64,
    },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
