//! Metrics definitions for the Room Controller.
//!
//! All metrics follow Prometheus naming conventions:
//! - `rc_` prefix for Room Controller
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `operation`: bounded by code (get_meeting_record, create_room, ...)
//! - `status`: 2 values (success, error)
//! - `reason`: bounded by `RcError` variants
//!
//! Room titles, attendee names, and emails are never used as labels.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus metrics recorder and return the handle for
/// serving metrics over HTTP (the front door owns the endpoint).
///
/// Must be called before any metrics are recorded. Histogram buckets are
/// aligned with the service targets: DB queries p99 < 50ms, provider
/// round-trips p95 < 2s, whole join/end flows p95 < 3s.
///
/// # Errors
///
/// Returns an error if the recorder fails to install (e.g., already
/// installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("rc_db_query".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("rc_provider_request".to_string()),
            &[
                0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.000, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set provider request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("rc_join".to_string()),
            &[
                0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.000, 3.000, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set join buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("rc_end".to_string()),
            &[
                0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.000, 3.000, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set end buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record a database query.
///
/// Metrics: `rc_db_queries_total`, `rc_db_query_duration_seconds`
/// Labels: `operation`, `status`
pub fn record_db_query(operation: &'static str, status: &'static str, duration: Duration) {
    counter!(
        "rc_db_queries_total",
        "operation" => operation,
        "status" => status,
    )
    .increment(1);

    histogram!(
        "rc_db_query_duration_seconds",
        "operation" => operation,
        "status" => status,
    )
    .record(duration.as_secs_f64());
}

/// Record a conferencing-provider round-trip.
///
/// Metrics: `rc_provider_requests_total`, `rc_provider_request_duration_seconds`
/// Labels: `operation`, `status`
pub fn record_provider_request(
    operation: &'static str,
    status: &'static str,
    duration: Duration,
) {
    counter!(
        "rc_provider_requests_total",
        "operation" => operation,
        "status" => status,
    )
    .increment(1);

    histogram!(
        "rc_provider_request_duration_seconds",
        "operation" => operation,
        "status" => status,
    )
    .record(duration.as_secs_f64());
}

/// Record a completed join flow.
///
/// Metrics: `rc_joins_total`, `rc_join_duration_seconds`
/// Labels: `status`, plus `reason` on errors
pub fn record_join(status: &'static str, reason: Option<&'static str>, duration: Duration) {
    let reason = reason.unwrap_or("none");

    counter!(
        "rc_joins_total",
        "status" => status,
        "reason" => reason,
    )
    .increment(1);

    histogram!(
        "rc_join_duration_seconds",
        "status" => status,
    )
    .record(duration.as_secs_f64());
}

/// Record a completed end flow.
///
/// Metrics: `rc_ends_total`, `rc_end_duration_seconds`
/// Labels: `status`
pub fn record_end(status: &'static str, duration: Duration) {
    counter!(
        "rc_ends_total",
        "status" => status,
    )
    .increment(1);

    histogram!(
        "rc_end_duration_seconds",
        "status" => status,
    )
    .record(duration.as_secs_f64());
}
