//! Metrics collection and exposition.
//!
//! # Metrics
//! - `recs_requests_total` (counter): inbound requests by method, status
//! - `recs_request_duration_seconds` (histogram): inbound latency
//! - `recs_fetch_outcomes_total` (counter): engine call outcomes by breaker
//! - `recs_fetch_duration_seconds` (histogram): engine call latency
//! - `recs_fetch_rejected_total` (counter): calls rejected by an open breaker
//! - `recs_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//!
//! # Design Decisions
//! - Prometheus exposition on a dedicated listener
//! - Recording helpers take plain values so callers stay macro-free

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Record one inbound request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "recs_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!("recs_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one guarded engine call.
pub fn record_fetch_outcome(breaker: &str, outcome: &'static str, latency: Duration) {
    counter!(
        "recs_fetch_outcomes_total",
        "breaker" => breaker.to_string(),
        "outcome" => outcome,
    )
    .increment(1);
    histogram!(
        "recs_fetch_duration_seconds",
        "breaker" => breaker.to_string(),
    )
    .record(latency.as_secs_f64());
}

/// Record a call rejected without an attempt.
pub fn record_fetch_rejected(breaker: &str) {
    counter!("recs_fetch_rejected_total", "breaker" => breaker.to_string()).increment(1);
}

/// Record a breaker state transition.
pub fn record_breaker_state(breaker: &str, state_code: u8) {
    gauge!("recs_breaker_state", "breaker" => breaker.to_string()).set(state_code as f64);
}
