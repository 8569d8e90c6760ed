//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, prefix
//! - `proxy_request_duration_seconds` (histogram): latency by method, prefix
//! - `proxy_upstream_errors_total` (counter): transport failures by prefix
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Label used when a request never resolved to a prefix.
pub const NO_PREFIX: &str = "none";

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, prefix: &str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "prefix" => prefix.to_string()
    )
    .increment(1);

    histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "prefix" => prefix.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record an upstream transport failure.
pub fn record_upstream_error(prefix: &str) {
    counter!("proxy_upstream_errors_total", "prefix" => prefix.to_string()).increment(1);
}
