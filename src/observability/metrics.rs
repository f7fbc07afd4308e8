//! Metrics collection and exposition.
//!
//! # Metrics
//! - `passport_proxy_requests_total` (counter): requests by method, status, route
//! - `passport_proxy_request_duration_seconds` (histogram): latency distribution
//! - `passport_proxy_upstream_calls_total` (counter): upstream calls by outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed inbound request.
pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();

    metrics::counter!(
        "passport_proxy_requests_total",
        "method" => method.clone(),
        "status" => status.clone(),
        "route" => route
    )
    .increment(1);

    metrics::histogram!(
        "passport_proxy_request_duration_seconds",
        "method" => method,
        "status" => status,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one upstream attempt by outcome label.
pub fn record_upstream(outcome: &'static str) {
    metrics::counter!("passport_proxy_upstream_calls_total", "outcome" => outcome).increment(1);
}
