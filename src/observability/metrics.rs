//! Metrics collection and exposition.
//!
//! # Metrics
//! - `nva_cycles_total` (counter): cycles by result (ok, partial, aborted)
//! - `nva_route_updates_total` (counter): route mutations by result
//! - `nva_routes_discovered` (gauge): managed routes seen last cycle
//! - `nva_appliance_healthy` (gauge): 1=running, 0=not, per appliance

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!("nva_cycles_total", "Reconciliation cycles by result");
            describe_counter!("nva_route_updates_total", "Route mutations by result");
            describe_gauge!("nva_routes_discovered", "Managed routes discovered last cycle");
            describe_gauge!("nva_appliance_healthy", "Appliance running state (1 running)");
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

pub fn record_cycle(result: &'static str) {
    counter!("nva_cycles_total", "result" => result).increment(1);
}

pub fn record_route_update(success: bool) {
    let result = if success { "succeeded" } else { "failed" };
    counter!("nva_route_updates_total", "result" => result).increment(1);
}

pub fn record_routes_discovered(count: usize) {
    gauge!("nva_routes_discovered").set(count as f64);
}

pub fn record_appliance_health(appliance: &str, running: bool) {
    gauge!("nva_appliance_healthy", "appliance" => appliance.to_string())
        .set(if running { 1.0 } else { 0.0 });
}
