use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a detected issue.
///
/// The set is open: anything outside the well-known variants is carried as
/// [`IssueType::Custom`]. Serialized as a snake_case string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueType {
    PerformanceDegradation,
    MemoryLeak,
    ConnectionFailure,
    DiskSpaceLow,
    ServiceUnresponsive,
    SecurityBreach,
    ConfigurationError,
    NetworkIssue,
    Custom(String),
}

impl IssueType {
    /// All well-known variants.
    pub const KNOWN: [IssueType; 8] = [
        IssueType::PerformanceDegradation,
        IssueType::MemoryLeak,
        IssueType::ConnectionFailure,
        IssueType::DiskSpaceLow,
        IssueType::ServiceUnresponsive,
        IssueType::SecurityBreach,
        IssueType::ConfigurationError,
        IssueType::NetworkIssue,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::PerformanceDegradation => "performance_degradation",
            Self::MemoryLeak => "memory_leak",
            Self::ConnectionFailure => "connection_failure",
            Self::DiskSpaceLow => "disk_space_low",
            Self::ServiceUnresponsive => "service_unresponsive",
            Self::SecurityBreach => "security_breach",
            Self::ConfigurationError => "configuration_error",
            Self::NetworkIssue => "network_issue",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for IssueType {
    fn from(value: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|known| known.as_str() == value)
            .cloned()
            .unwrap_or_else(|| Self::Custom(value.to_string()))
    }
}

impl From<String> for IssueType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<IssueType> for String {
    fn from(value: IssueType) -> Self {
        match value {
            IssueType::Custom(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
