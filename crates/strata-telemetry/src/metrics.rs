//! Request metrics.
//!
//! Thin recording helpers over the `metrics` facade. The binary decides
//! whether a recorder is installed; these functions do not care.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Counter of settled requests.
pub const REQUESTS_TOTAL: &str = "strata_requests_total";

/// Histogram of handler latency.
pub const REQUEST_DURATION_SECONDS: &str = "strata_request_duration_seconds";

/// Gauge of requests currently being served.
pub const IN_FLIGHT_REQUESTS: &str = "strata_in_flight_requests";

/// Registers descriptions for the standard metrics.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of settled requests");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Handler latency in seconds");
    describe_gauge!(IN_FLIGHT_REQUESTS, "Requests currently being served");
}

/// Records a settled request.
///
/// `outcome` is `"success"`, `"error"` or `"aborted"`.
pub fn record_request(operation: &str, outcome: &'static str, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        REQUEST_DURATION_SECONDS,
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Keeps the in-flight gauge raised while alive.
///
/// The gauge is lowered on drop, so connections that end in an error or a
/// panic are still accounted for.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Raises the gauge and returns the guard.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}
