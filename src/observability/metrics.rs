//! Metrics collection and exposition.
//!
//! # Metrics
//! - `funnel_requests_total` (counter): requests by route, status
//! - `funnel_admin_auth_failures_total` (counter): 401s seen by the gate
//! - `funnel_admin_blocked_total` (counter): 429s issued by the gate
//! - `funnel_store_unavailable_total` (counter): attempt store failures by op
//! - `funnel_upstream_errors_total` (counter): data store / email failures
//! - `funnel_signups_total`, `funnel_page_views_total` (counters)

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, status: u16) {
    counter!("funnel_requests_total", "route" => route.to_string(), "status" => status.to_string())
        .increment(1);
}

pub fn record_admin_auth_failure() {
    counter!("funnel_admin_auth_failures_total").increment(1);
}

pub fn record_admin_blocked() {
    counter!("funnel_admin_blocked_total").increment(1);
}

pub fn record_store_unavailable(op: &'static str) {
    counter!("funnel_store_unavailable_total", "op" => op).increment(1);
}

pub fn record_upstream_error(service: &'static str) {
    counter!("funnel_upstream_errors_total", "service" => service).increment(1);
}

pub fn record_signup() {
    counter!("funnel_signups_total").increment(1);
}

pub fn record_page_view(device: &'static str) {
    counter!("funnel_page_views_total", "device" => device).increment(1);
}
