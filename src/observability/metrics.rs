//! Metrics collection and exposition.
//!
//! # Metrics
//! - `manager_operations_total` (counter): operations by name and outcome
//! - `manager_exchanges` (gauge): registered exchange count
//! - `manager_consumer_processes` (gauge): live consumer process count
//!
//! # Design Decisions
//! - Recording is always on (no-op until an exporter is installed); the
//!   Prometheus endpoint itself is gated by config

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "manager_operations_total",
                "Management operations by name and outcome"
            );
            describe_gauge!("manager_exchanges", "Registered exchange count");
            describe_gauge!(
                "manager_consumer_processes",
                "Live consumer process count"
            );
            tracing::info!(address = %addr, "metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to install metrics exporter");
        }
    }
}

/// Count one management operation.
pub fn record_operation(operation: &'static str, outcome: &'static str) {
    counter!("manager_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

/// Track the registered exchange count.
pub fn record_exchange_count(count: usize) {
    gauge!("manager_exchanges").set(count as f64);
}

/// Track the live consumer process count.
pub fn record_process_count(count: usize) {
    gauge!("manager_consumer_processes").set(count as f64);
}
