//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lookup_requests_total` (counter): lookups by outcome (hit, miss, invalid)
//! - `lookup_reloads_total` (counter): reloads by outcome (success or error kind)
//! - `lookup_reload_duration_seconds` (histogram): time to build and install a table
//! - `lookup_table_records` (gauge): entries in the active table

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_lookup(outcome: &'static str) {
    counter!("lookup_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_reload(outcome: &'static str, started: Instant) {
    counter!("lookup_reloads_total", "outcome" => outcome).increment(1);
    histogram!("lookup_reload_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_table_size(records: usize) {
    gauge!("lookup_table_records").set(records as f64);
}
