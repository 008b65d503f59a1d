//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tenancy_resolutions_total` (counter): resolved candidates by source
//! - `tenancy_rejections_total` (counter): refused requests by reason
//! - `tenancy_quota_denials_total` (counter): limit denials by resource
//! - `tenancy_feature_denials_total` (counter): feature denials by feature
//!
//! # Design Decisions
//! - Labels never carry tenant ids (unbounded cardinality)
//! - Recording is a no-op until `init_metrics` installs the exporter

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(source: &'static str) {
    counter!("tenancy_resolutions_total", "source" => source).increment(1);
}

pub fn record_rejection(reason: &'static str) {
    counter!("tenancy_rejections_total", "reason" => reason).increment(1);
}

pub fn record_quota_denied(resource: &str) {
    counter!("tenancy_quota_denials_total", "resource" => resource.to_string()).increment(1);
}

pub fn record_feature_denied(feature: &str) {
    counter!("tenancy_feature_denials_total", "feature" => feature.to_string()).increment(1);
}
