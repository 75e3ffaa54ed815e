use crate::models::SystemIssue;

/// Receives issues the controller could not recover from.
pub trait IEscalationSink: Send + Sync {
    fn escalate(&self, issue: &SystemIssue);
}

/// Escalation sink that drops everything. Escalations are still logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEscalation;

impl IEscalationSink for NoopEscalation {
    fn escalate(&self, _issue: &SystemIssue) {}
}
