//! Telemetry: structured logging, request spans, and batch metrics.

mod logging;
mod metrics;
mod spans;
mod store;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use metrics::{global_store, record_batch_failure, record_batch_success, record_rejection};
pub use spans::{BatchSpan, SpanExt};
pub use store::{HistogramSummary, MetricsSnapshot, MetricsStore};
