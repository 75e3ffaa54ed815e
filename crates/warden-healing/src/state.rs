//! Mutable controller state, owned by the engine and mutated only inside a tick
//! or a mutator call.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use warden_core::config::HistoryConfig;
use warden_core::models::{IssueType, RecoveryAction, SystemIssue};
use warden_observability::DegradationTracker;

use crate::history::MetricHistory;

/// Active issues, bounded histories, and per-source bookkeeping.
///
/// Active issues are keyed by type, so at most one unresolved issue of a
/// type can exist at a time.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub history: MetricHistory,
    pub degradation: DegradationTracker,
    active: BTreeMap<IssueType, SystemIssue>,
    resolved: VecDeque<SystemIssue>,
    resolved_capacity: usize,
    actions: VecDeque<RecoveryAction>,
    action_capacity: usize,
    /// Metric names each source has reported at least once.
    source_metrics: HashMap<String, BTreeSet<String>>,
    ticks: u64,
}

impl ControllerState {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            history: MetricHistory::new(config.metric_capacity),
            degradation: DegradationTracker::with_capacity(config.degradation_capacity),
            active: BTreeMap::new(),
            resolved: VecDeque::new(),
            resolved_capacity: config.resolved_capacity.max(1),
            actions: VecDeque::new(),
            action_capacity: config.action_capacity.max(1),
            source_metrics: HashMap::new(),
            ticks: 0,
        }
    }

    pub fn next_tick(&mut self) -> u64 {
        self.ticks += 1;
        self.ticks
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // --- active issues ---

    pub fn has_active(&self, issue_type: &IssueType) -> bool {
        self.active.contains_key(issue_type)
    }

    /// Insert a newly detected issue. Returns false, leaving the map
    /// untouched, if an issue of that type is already active.
    pub fn insert_active(&mut self, issue: SystemIssue) -> bool {
        if self.active.contains_key(&issue.issue_type) {
            return false;
        }
        self.active.insert(issue.issue_type.clone(), issue);
        true
    }

    pub fn active(&self, issue_type: &IssueType) -> Option<&SystemIssue> {
        self.active.get(issue_type)
    }

    pub fn active_mut(&mut self, issue_type: &IssueType) -> Option<&mut SystemIssue> {
        self.active.get_mut(issue_type)
    }

    /// Type of the active issue with `id`.
    pub fn find_active(&self, id: &str) -> Option<IssueType> {
        self.active
            .values()
            .find(|issue| issue.id == id)
            .map(|issue| issue.issue_type.clone())
    }

    pub fn active_types(&self) -> Vec<IssueType> {
        self.active.keys().cloned().collect()
    }

    /// Copies of every active issue, oldest detection first.
    pub fn active_issues(&self) -> Vec<SystemIssue> {
        let mut issues: Vec<SystemIssue> = self.active.values().cloned().collect();
        issues.sort_by_key(|issue| issue.detected_at);
        issues
    }

    /// Move a closed issue from the active map into resolved history.
    pub fn retire(&mut self, issue_type: &IssueType) -> Option<SystemIssue> {
        let issue = self.active.remove(issue_type)?;
        self.resolved.push_back(issue.clone());
        while self.resolved.len() > self.resolved_capacity {
            self.resolved.pop_front();
        }
        Some(issue)
    }

    // --- histories ---

    /// Up to `limit` most recently closed issues, most recent last.
    pub fn resolved_issues(&self, limit: usize) -> Vec<SystemIssue> {
        tail(&self.resolved, limit)
    }

    pub fn all_resolved(&self) -> impl Iterator<Item = &SystemIssue> {
        self.resolved.iter()
    }

    pub fn push_action(&mut self, action: RecoveryAction) {
        self.actions.push_back(action);
        while self.actions.len() > self.action_capacity {
            self.actions.pop_front();
        }
    }

    /// Up to `limit` most recent recovery actions, most recent last.
    pub fn recovery_history(&self, limit: usize) -> Vec<RecoveryAction> {
        tail(&self.actions, limit)
    }

    pub fn all_actions(&self) -> impl Iterator<Item = &RecoveryAction> {
        self.actions.iter()
    }

    // --- sources ---

    pub fn learn_metric(&mut self, source: &str, metric: &str) {
        let known = self.source_metrics.entry(source.to_string()).or_default();
        if !known.contains(metric) {
            known.insert(metric.to_string());
        }
    }

    /// Metric names `source` is expected to report, sorted.
    pub fn expected_metrics(&self, source: &str) -> Vec<String> {
        self.source_metrics
            .get(source)
            .map(|known| known.iter().cloned().collect())
            .unwrap_or_default()
    }
}

fn tail<T: Clone>(items: &VecDeque<T>, limit: usize) -> Vec<T> {
    items
        .iter()
        .skip(items.len().saturating_sub(limit))
        .cloned()
        .collect()
}
