//! Prometheus metrics setup and metric definitions

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering
/// metrics at `/metrics`.
pub fn install_prometheus_recorder() -> PrometheusHandle {
    // Latency buckets in seconds; sub-millisecond buckets cover the
    // resolution path, which is one or two point lookups.
    let buckets = vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets(&buckets)
        .expect("failed to set histogram buckets")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Register metric descriptions so Prometheus output carries HELP/TYPE
/// lines from startup.
pub fn describe_metrics() {
    describe_counter!(
        "sitefab_http_requests_total",
        "Total number of HTTP requests"
    );
    describe_histogram!(
        "sitefab_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "sitefab_tenant_resolution_total",
        "Tenant resolution attempts by outcome and strategy"
    );
}
