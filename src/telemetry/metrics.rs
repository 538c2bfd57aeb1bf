//! Batch metrics, emitted through the `metrics` facade and mirrored into the
//! process-wide [`MetricsStore`].

use std::sync::OnceLock;

use super::store::MetricsStore;
use crate::sorter::Strategy;

pub const BATCHES_TOTAL: &str = "parsort_batches_total";
pub const BATCH_FAILURES_TOTAL: &str = "parsort_batch_failures_total";
pub const REJECTED_REQUESTS_TOTAL: &str = "parsort_rejected_requests_total";
pub const SORT_DURATION_NS: &str = "parsort_sort_duration_ns";
pub const BATCH_ITEMS: &str = "parsort_batch_items";
pub const BATCH_ELEMENTS: &str = "parsort_batch_elements";

static STORE: OnceLock<MetricsStore> = OnceLock::new();

/// The process-wide metrics store.
pub fn global_store() -> &'static MetricsStore {
    STORE.get_or_init(MetricsStore::new)
}

fn key(name: &str, strategy: Strategy) -> String {
    format!("{}.{}", name, strategy.as_str())
}

pub fn record_batch_success(strategy: Strategy, items: usize, elements: usize, time_ns: i64) {
    let label = strategy.as_str();
    ::metrics::counter!(BATCHES_TOTAL, "strategy" => label).increment(1);
    ::metrics::histogram!(SORT_DURATION_NS, "strategy" => label).record(time_ns as f64);
    ::metrics::histogram!(BATCH_ITEMS, "strategy" => label).record(items as f64);
    ::metrics::histogram!(BATCH_ELEMENTS, "strategy" => label).record(elements as f64);

    let store = global_store();
    store.increment_counter(&key(BATCHES_TOTAL, strategy), 1);
    store.record_histogram(&key(SORT_DURATION_NS, strategy), time_ns as f64);
    store.record_histogram(&key(BATCH_ITEMS, strategy), items as f64);
    store.record_histogram(&key(BATCH_ELEMENTS, strategy), elements as f64);
}

pub fn record_batch_failure(strategy: Strategy, kind: &'static str) {
    ::metrics::counter!(
        BATCH_FAILURES_TOTAL,
        "strategy" => strategy.as_str(),
        "kind" => kind
    )
    .increment(1);
    global_store().increment_counter(&format!("{}.{}", key(BATCH_FAILURES_TOTAL, strategy), kind), 1);
}

/// A request refused before reaching the coordinator (bad payload, draining).
pub fn record_rejection(reason: &'static str) {
    ::metrics::counter!(REJECTED_REQUESTS_TOTAL, "reason" => reason).increment(1);
    global_store().increment_counter(&format!("{}.{}", REJECTED_REQUESTS_TOTAL, reason), 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_mirrored_into_store() {
        let before = global_store().counter("parsort_batches_total.sequential");
        record_batch_success(Strategy::Sequential, 3, 5, 1200);
        let after = global_store().counter("parsort_batches_total.sequential");
        assert!(after > before);
        assert!(global_store()
            .histogram("parsort_sort_duration_ns.sequential")
            .is_some());
    }

    #[test]
    fn test_failure_keyed_by_kind() {
        record_batch_failure(Strategy::Concurrent, "timeout");
        assert!(global_store().counter("parsort_batch_failures_total.concurrent.timeout") >= 1);
    }
}
