//! Metrics definitions for the JWKS service
//!
//! All metrics follow Prometheus naming conventions:
//! - `jwks_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `key_state`: 2 values (valid, expired)
//! - `status`: 2 values (success, error)
//! - `path`: bounded by the route table, unknown paths collapse to `/other`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder
///
/// Fails if a recorder is already installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Token issuance is one RSA signature plus one SQLite read
        .set_buckets_for_metric(
            Matcher::Prefix("jwks_token_issuance".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("jwks_http_request".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `jwks_token_issuance_duration_seconds`, `jwks_token_issuance_total`
/// Labels: `key_state`, `status`
pub fn record_token_issuance(key_state: &str, status: &str, duration: Duration) {
    histogram!("jwks_token_issuance_duration_seconds", "key_state" => key_state.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("jwks_token_issuance_total", "key_state" => key_state.to_string(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// Key Management Metrics
// ============================================================================

/// Record a generated signing key
///
/// Metric: `jwks_keys_generated_total`
/// Labels: `key_state`
pub fn record_key_generated(key_state: &str) {
    counter!("jwks_keys_generated_total", "key_state" => key_state.to_string()).increment(1);
}

// ============================================================================
// JWKS Metrics
// ============================================================================

/// Record a JWKS document request
///
/// Metric: `jwks_requests_total`
/// Labels: `status`
pub fn record_jwks_request(status: &str) {
    counter!("jwks_requests_total", "status" => status.to_string()).increment(1);
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `jwks_http_requests_total`, `jwks_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
///
/// Captures framework-level responses as well, including 405 Method Not Allowed.
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let normalized_path = normalize_path(path);

    histogram!("jwks_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path.to_string(),
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("jwks_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Keep known paths, collapse everything else to bound label cardinality.
fn normalize_path(path: &str) -> &'static str {
    match path {
        "/auth" => "/auth",
        "/.well-known/jwks.json" => "/.well-known/jwks.json",
        "/health" => "/health",
        "/metrics" => "/metrics",
        _ => "/other",
    }
}
