//! Worker metrics.

use metrics::{counter, describe_counter};

/// Requests handled counter, labelled by operation.
pub const WORKER_REQUESTS: &str = "meridian_worker_requests_total";

/// Request failures counter, labelled by operation and reason code.
pub const WORKER_FAILURES: &str = "meridian_worker_failures_total";

/// Registers all worker metric descriptions.
///
/// Call this once at application startup after initializing the metrics
/// recorder.
pub fn register_metrics() {
    describe_counter!(WORKER_REQUESTS, "Total protocol requests handled");
    describe_counter!(WORKER_FAILURES, "Total protocol requests failed");
}

/// Records one handled request.
pub fn record_request(operation: &'static str) {
    counter!(WORKER_REQUESTS, "operation" => operation).increment(1);
}

/// Records one failed request.
pub fn record_failure(operation: &'static str, code: &'static str) {
    counter!(WORKER_FAILURES, "operation" => operation, "code" => code).increment(1);
}
