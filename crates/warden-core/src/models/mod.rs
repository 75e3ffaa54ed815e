mod alert;
mod degradation_event;
mod health_metric;
mod health_report;
mod issue_type;
mod recovery_action;
mod status;
mod system_issue;

pub use alert::{Alert, AlertLevel};
pub use degradation_event::DegradationEvent;
pub use health_metric::HealthMetric;
pub use health_report::{HealthReport, MetricSummary, RecoverySummary};
pub use issue_type::IssueType;
pub use recovery_action::RecoveryAction;
pub use status::Status;
pub use system_issue::SystemIssue;
