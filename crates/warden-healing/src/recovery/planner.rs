use warden_core::config::StrategyTable;
use warden_core::models::IssueType;

/// Ordered strategy lookup per issue type.
#[derive(Debug, Clone, Default)]
pub struct RecoveryPlanner {
    strategies: StrategyTable,
}

impl RecoveryPlanner {
    pub fn new(strategies: StrategyTable) -> Self {
        Self { strategies }
    }

    /// Strategies to try for `issue_type`, highest priority first.
    /// Empty when the type has no entry.
    pub fn strategies_for(&self, issue_type: &IssueType) -> &[String] {
        self.strategies.get(issue_type)
    }
}
