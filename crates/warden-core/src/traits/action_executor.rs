use crate::errors::ExecutionError;
use crate::models::SystemIssue;

/// Performs a named recovery strategy against an issue.
pub trait IActionExecutor: Send + Sync {
    /// Attempt `strategy` once.
    ///
    /// `Ok(true)` means the action succeeded, `Ok(false)` a clean failure.
    /// An `Err` is recorded as a failed attempt with its message.
    fn execute(&self, strategy: &str, issue: &SystemIssue) -> Result<bool, ExecutionError>;
}
