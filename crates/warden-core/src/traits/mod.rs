mod action_executor;
mod escalation_sink;
mod metric_source;

pub use action_executor::IActionExecutor;
pub use escalation_sink::{IEscalationSink, NoopEscalation};
pub use metric_source::IMetricSource;
