//! Scripted recovery executors and escalation sinks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use warden_core::errors::ExecutionError;
use warden_core::models::SystemIssue;
use warden_core::traits::{IActionExecutor, IEscalationSink};

/// How a [`ScriptedExecutor`] answers a strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeed,
    Fail,
    Error(String),
    Panic,
}

/// Executor with a fixed outcome per strategy name. Records every call.
pub struct ScriptedExecutor {
    outcomes: HashMap<String, Outcome>,
    default: Outcome,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedExecutor {
    pub fn new(default: Outcome) -> Self {
        Self {
            outcomes: HashMap::new(),
            default,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always_succeed() -> Self {
        Self::new(Outcome::Succeed)
    }

    pub fn always_fail() -> Self {
        Self::new(Outcome::Fail)
    }

    pub fn with(mut self, strategy: &str, outcome: Outcome) -> Self {
        self.outcomes.insert(strategy.to_string(), outcome);
        self
    }

    /// Strategies attempted so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(|(strategy, _)| strategy.clone())
            .collect()
    }

    /// Strategies attempted for one issue, in order.
    pub fn calls_for(&self, issue_id: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .filter(|(_, id)| id == issue_id)
            .map(|(strategy, _)| strategy.clone())
            .collect()
    }
}

impl IActionExecutor for ScriptedExecutor {
    fn execute(&self, strategy: &str, issue: &SystemIssue) -> Result<bool, ExecutionError> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((strategy.to_string(), issue.id.clone()));

        match self.outcomes.get(strategy).unwrap_or(&self.default) {
            Outcome::Succeed => Ok(true),
            Outcome::Fail => Ok(false),
            Outcome::Error(reason) => Err(ExecutionError::StrategyFailed {
                strategy: strategy.to_string(),
                reason: reason.clone(),
            }),
            Outcome::Panic => panic!("scripted executor panicked on {strategy}"),
        }
    }
}

/// Escalation sink that keeps every issue it receives.
#[derive(Default)]
pub struct RecordingEscalation {
    issues: Mutex<Vec<SystemIssue>>,
}

impl RecordingEscalation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn escalated(&self) -> Vec<SystemIssue> {
        self.issues.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl IEscalationSink for RecordingEscalation {
    fn escalate(&self, issue: &SystemIssue) {
        self.issues
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(issue.clone());
    }
}

/// Escalation sink that panics on every issue, after counting it.
#[derive(Default)]
pub struct PanickingEscalation {
    calls: AtomicUsize,
}

impl PanickingEscalation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IEscalationSink for PanickingEscalation {
    fn escalate(&self, issue: &SystemIssue) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("escalation sink down for {}", issue.id);
    }
}
