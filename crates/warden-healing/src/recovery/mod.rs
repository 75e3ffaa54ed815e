//! Recovery planning and strategy execution.

pub mod orchestrator;
pub mod planner;

pub use orchestrator::{execute_plan, InFlightGuard, RecoveryOutcome};
pub use planner::RecoveryPlanner;
