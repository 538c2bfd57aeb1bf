//! Span helpers for sort requests.

use tracing::{info_span, Span};

use crate::sorter::Strategy;

/// Extension trait for recording outcomes into a span.
pub trait SpanExt {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for per-batch spans.
pub struct BatchSpan;

impl BatchSpan {
    /// Span for one sort request. `status`, `error.message` and `time_ns`
    /// start empty and are filled in on completion.
    pub fn new(request_id: &str, strategy: Strategy, items: usize) -> Span {
        info_span!(
            "sort_batch",
            request_id = %request_id,
            strategy = strategy.as_str(),
            items,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            time_ns = tracing::field::Empty,
        )
    }
}
