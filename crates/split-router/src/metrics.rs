use metrics::{counter, histogram};
use std::time::Duration;

/// Route requests handled, labelled by chain and outcome
pub const REQUESTS_TOTAL: &str = "split_router_requests_total";

/// Requests answered by the wrap/unwrap shortcut
pub const WRAPS_TOTAL: &str = "split_router_wraps_total";

/// Routing API calls that failed
pub const API_ERRORS_TOTAL: &str = "split_router_api_errors_total";

/// Split queries that reverted, failed or returned garbage
pub const SIMULATION_FAILURES_TOTAL: &str = "split_router_simulation_failures_total";

/// Requests resolved with no usable route
pub const NO_LIQUIDITY_TOTAL: &str = "split_router_no_liquidity_total";

/// End to end latency of a single route request
pub const REQUEST_DURATION_SECONDS: &str = "split_router_request_duration_seconds";

pub fn record_request(chain_id: u64, outcome: &'static str, elapsed: Duration) {
    counter!(REQUESTS_TOTAL, "chain_id" => chain_id.to_string(), "outcome" => outcome).increment(1);
    histogram!(REQUEST_DURATION_SECONDS, "chain_id" => chain_id.to_string()).record(elapsed.as_secs_f64());
}

pub fn record_wrap(chain_id: u64, kind: &str) {
    counter!(WRAPS_TOTAL, "chain_id" => chain_id.to_string(), "kind" => kind.to_string()).increment(1);
}

pub fn record_api_error(endpoint: &str, timeout: bool) {
    let reason = if timeout { "timeout" } else { "error" };
    counter!(API_ERRORS_TOTAL, "endpoint" => endpoint.to_string(), "reason" => reason).increment(1);
}

pub fn record_simulation_failure(chain_id: u64) {
    counter!(SIMULATION_FAILURES_TOTAL, "chain_id" => chain_id.to_string()).increment(1);
}

pub fn record_no_liquidity(chain_id: u64) {
    counter!(NO_LIQUIDITY_TOTAL, "chain_id" => chain_id.to_string()).increment(1);
}
