use super::{CollectionError, ConfigError, ExecutionError};

/// Top-level error for the Warden controller.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    #[error("collection error: {0}")]
    CollectionError(#[from] CollectionError),

    #[error("execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("issue not found: {id}")]
    IssueNotFound { id: String },

    #[error("control loop is already running")]
    AlreadyRunning,

    #[error("control loop is not running")]
    NotRunning,

    #[error("replan of issue {id} refused: backoff has {remaining_secs}s remaining")]
    ReplanBackoff { id: String, remaining_secs: u64 },

    #[error("recovery already in flight for issue {id}")]
    RecoveryInFlight { id: String },

    #[error("{what} lock poisoned")]
    LockPoisoned { what: String },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("background task failed: {reason}")]
    TaskJoin { reason: String },
}

pub type WardenResult<T> = Result<T, WardenError>;
