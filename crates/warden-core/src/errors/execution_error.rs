/// Recovery strategy execution errors. Each one is a failed attempt, never fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("strategy {strategy} failed: {reason}")]
    StrategyFailed { strategy: String, reason: String },

    #[error("strategy {strategy} is not supported by this executor")]
    Unsupported { strategy: String },

    #[error("strategy {strategy} panicked")]
    Panicked { strategy: String },
}
