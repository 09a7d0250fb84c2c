//! Prometheus metrics for the records API.

use std::net::SocketAddr;

use metrics::counter;

/// Install the Prometheus exporter, serving `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record a successful write (create/update/delete) on a resource.
pub fn write_recorded(resource: &'static str, operation: &'static str) {
    counter!("school_writes_total", "resource" => resource, "operation" => operation).increment(1);
}

/// Record a failed request by status code.
pub fn request_failed(status: u16) {
    counter!("school_errors_total", "status" => status.to_string()).increment(1);
}
