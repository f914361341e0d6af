//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_requests_total` (counter): requests by strategy and status
//! - `guard_request_duration_seconds` (histogram): latency by strategy
//! - `guard_rate_limited_total` (counter): bucket-empty rejections
//! - `guard_circuit_open_total` (counter): fail-fast short circuits
//! - `guard_cache_fallback_total` (counter): degraded responses served
//!
//! # Design Decisions
//! - Recording helpers are cheap and infallible; when no exporter is
//!   installed the macros are no-ops
//! - Labels limited to strategy and status to keep cardinality flat

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_request(strategy: &'static str, status: u16, start: Instant) {
    counter!(
        "guard_requests_total",
        "strategy" => strategy,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("guard_request_duration_seconds", "strategy" => strategy)
        .record(start.elapsed().as_secs_f64());
}

/// Record a bucket-empty rejection.
pub fn record_rate_limited() {
    counter!("guard_rate_limited_total").increment(1);
}

/// Record a fail-fast short circuit.
pub fn record_circuit_open() {
    counter!("guard_circuit_open_total").increment(1);
}

/// Record a degraded (cache-served) response.
pub fn record_cache_fallback() {
    counter!("guard_cache_fallback_total").increment(1);
}
