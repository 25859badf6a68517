//! Metrics collection and exposition.
//!
//! # Metrics
//! - `devserve_requests_total` (counter): routed requests by branch
//! - `devserve_reload_broadcasts_total` (counter): reload frames fanned out
//! - `devserve_live_clients` (gauge): connected live-reload clients
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus exporter is optional and serves its own HTTP listener

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one routed request.
pub fn record_route(branch: &'static str) {
    counter!("devserve_requests_total", "branch" => branch).increment(1);
}

/// Count one reload broadcast.
pub fn record_reload() {
    counter!("devserve_reload_broadcasts_total").increment(1);
}

pub fn record_live_clients(count: usize) {
    gauge!("devserve_live_clients").set(count as f64);
}
