//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mond_observations_total` (counter): recorded access-log lines by app
//! - `mond_health_reports_total` (counter): recorded health reports by state
//! - `mond_store_writes_total` (counter): full-registry rewrites by outcome
//! - `mond_store_write_duration_seconds` (histogram): rewrite latency
//! - `mond_store_apps` (gauge): applications in the registry
//! - `mond_probes_total` (counter): probe outcomes (up, status, down, timeout, panic)
//! - `mond_reports_total` (counter): agent reports by kind and outcome
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::ObservabilityConfig;
use crate::health::{STATUS_DOWN, STATUS_UP};

/// Install the Prometheus recorder with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> bool {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics endpoint listening");
            true
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
            false
        }
    }
}

/// Install the exporter if `config` enables it. Used by both binaries.
pub fn init_from_config(config: &ObservabilityConfig) -> bool {
    if !config.metrics_enabled {
        return false;
    }
    match config.metrics_address.parse() {
        Ok(addr) => init_metrics(addr),
        Err(e) => {
            tracing::error!(
                metrics_address = %config.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            );
            false
        }
    }
}

pub fn record_observation(app: &str) {
    counter!("mond_observations_total", "app" => app.to_string()).increment(1);
}

pub fn record_health_report(state: &str) {
    // Free-text states are folded to keep label cardinality bounded.
    let state = match state {
        STATUS_UP => "up",
        STATUS_DOWN => "down",
        _ => "other",
    };
    counter!("mond_health_reports_total", "state" => state).increment(1);
}

pub fn record_store_write(elapsed: Duration, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("mond_store_writes_total", "outcome" => outcome).increment(1);
    histogram!("mond_store_write_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_store_apps(count: usize) {
    gauge!("mond_store_apps").set(count as f64);
}

pub fn record_probe(outcome: &'static str) {
    counter!("mond_probes_total", "outcome" => outcome).increment(1);
}

pub fn record_report(kind: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("mond_reports_total", "kind" => kind, "outcome" => outcome).increment(1);
}
