//! Run metrics.
//!
//! # Metrics
//! - `e2e_setup_steps_total` (counter): completed setup steps by step
//! - `e2e_events_total` (counter): classified events by classification
//! - `e2e_runs_total` (counter): finished runs by result
//!
//! Without an installed recorder these are no-ops.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_setup_step(step: &'static str) {
    metrics::counter!("e2e_setup_steps_total", "step" => step).increment(1);
}

pub fn record_event(classification: &'static str) {
    metrics::counter!("e2e_events_total", "classification" => classification).increment(1);
}

pub fn record_run(result: &'static str) {
    metrics::counter!("e2e_runs_total", "result" => result).increment(1);
}
