//! Span definitions per operation: tick, collection, recovery.

/// Create a span covering one control-loop tick.
#[macro_export]
macro_rules! tick_span {
    ($tick:expr) => {
        tracing::info_span!("warden.tick", tick = $tick)
    };
}

/// Create a span covering collection from one metric source.
#[macro_export]
macro_rules! collection_span {
    ($source:expr) => {
        tracing::debug_span!("warden.collection", source = %$source)
    };
}

/// Create a span covering one planning round for an issue.
#[macro_export]
macro_rules! recovery_span {
    ($issue_id:expr, $issue_type:expr) => {
        tracing::info_span!("warden.recovery", issue_id = %$issue_id, issue_type = %$issue_type)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const TICK: &str = "warden.tick";
    pub const COLLECTION: &str = "warden.collection";
    pub const RECOVERY: &str = "warden.recovery";
}
