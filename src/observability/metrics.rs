//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_resolutions_total` (counter): lookups by scheme, outcome
//! - `gateway_resolution_duration_seconds` (histogram): lookup latency by scheme
//! - `gateway_transfers_total` (counter): transfers by asset, outcome
//! - `gateway_http_requests_total` (counter): requests by method, path, status
//! - `gateway_http_request_duration_seconds` (histogram): request latency
//! - `gateway_rpc_health` (gauge): 1=reachable, 0=unreachable, per network
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use ::metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_resolution(scheme: &'static str, outcome: &'static str, start: Instant) {
    counter!("gateway_resolutions_total", "scheme" => scheme, "outcome" => outcome).increment(1);
    histogram!("gateway_resolution_duration_seconds", "scheme" => scheme)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_transfer(asset: &'static str, outcome: &'static str) {
    counter!("gateway_transfers_total", "asset" => asset, "outcome" => outcome).increment(1);
}

pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    counter!(
        "gateway_http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_rpc_health(network: &str, healthy: bool) {
    gauge!("gateway_rpc_health", "network" => network.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
