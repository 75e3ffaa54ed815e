//! Ordered strategy execution for one planning round.
//!
//! Strategies are attempted in priority order until one reports success.
//! Every attempt, failed or not, becomes a [`RecoveryAction`]. Executor
//! errors and panics are failed attempts and the next strategy is tried.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use warden_core::errors::{ExecutionError, WardenError, WardenResult};
use warden_core::models::{RecoveryAction, SystemIssue};
use warden_core::traits::IActionExecutor;
use warden_observability::tracing_setup::events;

/// Result of one planning round.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryOutcome {
    pub issue_id: String,
    /// Every attempt, in execution order.
    pub actions: Vec<RecoveryAction>,
    /// Strategy that succeeded, if any.
    pub succeeded: Option<String>,
}

impl RecoveryOutcome {
    /// No strategy succeeded (including the case of no strategies at all).
    pub fn exhausted(&self) -> bool {
        self.succeeded.is_none()
    }
}

/// Attempt `strategies` against `issue` until one succeeds.
pub fn execute_plan(
    strategies: &[String],
    issue: &SystemIssue,
    executor: &dyn IActionExecutor,
    now: DateTime<Utc>,
) -> RecoveryOutcome {
    let mut outcome = RecoveryOutcome {
        issue_id: issue.id.clone(),
        ..RecoveryOutcome::default()
    };

    for strategy in strategies {
        let result = catch_unwind(AssertUnwindSafe(|| executor.execute(strategy, issue)))
            .unwrap_or_else(|_| {
                Err(ExecutionError::Panicked {
                    strategy: strategy.clone(),
                })
            });

        let (success, error) = match result {
            Ok(success) => (success, None),
            Err(e) => (false, Some(e.to_string())),
        };
        events::recovery_attempted(&issue.id, strategy, success, error.as_deref());
        outcome
            .actions
            .push(RecoveryAction::new(strategy.as_str(), issue, now, success, error));

        if success {
            outcome.succeeded = Some(strategy.clone());
            break;
        }
    }

    outcome
}

/// Marks an issue id as having a planning round in flight.
///
/// The id is released when the guard is dropped.
pub struct InFlightGuard {
    set: Arc<DashSet<String>>,
    id: String,
}

impl InFlightGuard {
    /// Claim `id`, or fail with `RecoveryInFlight` if it is already claimed.
    pub fn acquire(set: &Arc<DashSet<String>>, id: &str) -> WardenResult<Self> {
        if !set.insert(id.to_string()) {
            return Err(WardenError::RecoveryInFlight { id: id.to_string() });
        }
        Ok(Self {
            set: Arc::clone(set),
            id: id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.remove(&self.id);
    }
}
