//! # warden-healing
//!
//! The self-healing controller. Each tick collects metric samples, records
//! them in bounded per-metric history, detects issues from declarative
//! rules, runs recovery strategies in order until one succeeds, and closes
//! issues once their metric verifies as recovered.
//!
//! [`HealingEngine`] is the synchronous core driven by an explicit clock.
//! [`ControlLoop`] wraps it in a Tokio task with collection fan-out,
//! timeouts, and a start/stop lifecycle.

pub mod collection;
pub mod control_loop;
pub mod detection;
pub mod engine;
pub mod evaluator;
pub mod history;
pub mod recovery;
pub mod state;
pub mod verification;

pub use collection::{CollectionBatch, SourceReport};
pub use control_loop::{ControlLoop, ControlLoopBuilder, LoopState};
pub use detection::IssueDetector;
pub use engine::{HealingEngine, TickReport};
pub use evaluator::HealthEvaluator;
pub use history::{trend_slope, MetricHistory};
pub use recovery::{RecoveryOutcome, RecoveryPlanner};
pub use verification::ResolutionVerifier;
