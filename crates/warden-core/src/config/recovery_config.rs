use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::IssueType;

/// Recovery behaviour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Minimum seconds between planning rounds for the same issue.
    pub replan_backoff_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            replan_backoff_secs: defaults::DEFAULT_REPLAN_BACKOFF_SECS,
        }
    }
}

/// Ordered recovery strategies per issue type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyTable(BTreeMap<IssueType, Vec<String>>);

impl StrategyTable {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Strategies for `issue_type` in priority order. Empty if none are configured.
    pub fn get(&self, issue_type: &IssueType) -> &[String] {
        self.0.get(issue_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn insert(
        &mut self,
        issue_type: IssueType,
        strategies: impl IntoIterator<Item = impl Into<String>>,
    ) {
        self.0
            .insert(issue_type, strategies.into_iter().map(Into::into).collect());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IssueType, &Vec<String>)> {
        self.0.iter()
    }

    /// Overlay `overrides` on top of this table.
    pub fn merged_with(mut self, overrides: StrategyTable) -> Self {
        self.0.extend(overrides.0);
        self
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(
            IssueType::PerformanceDegradation,
            [
                "restart_slow_services",
                "clear_cache",
                "optimize_configuration",
                "scale_resources",
            ],
        );
        table.insert(
            IssueType::MemoryLeak,
            [
                "restart_affected_service",
                "clear_memory_cache",
                "garbage_collection",
                "memory_optimization",
            ],
        );
        table.insert(
            IssueType::ConnectionFailure,
            [
                "restart_network_service",
                "reset_connections",
                "update_network_config",
                "failover_to_backup",
            ],
        );
        table.insert(
            IssueType::DiskSpaceLow,
            [
                "cleanup_temp_files",
                "archive_old_logs",
                "compress_data",
                "expand_storage",
            ],
        );
        table.insert(
            IssueType::ServiceUnresponsive,
            [
                "restart_service",
                "kill_hanging_processes",
                "reset_service_config",
                "failover_service",
            ],
        );
        table
    }
}
