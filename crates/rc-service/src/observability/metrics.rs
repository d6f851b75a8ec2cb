//! Metrics definitions for the Room Controller.
//!
//! All metrics follow Prometheus naming conventions:
//! - `rc_` prefix for the Room Controller
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: ~12 values (parameterized paths)
//! - `status`: 3 values (success, error, timeout)
//! - `operation`: bounded by code (insert_room, end_room, complete_recording, etc.)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("rc_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("rc_db_query".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `rc_http_requests_total`, `rc_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// This captures ALL HTTP responses including framework-level errors like:
/// - 415 Unsupported Media Type (wrong Content-Type)
/// - 400 Bad Request (JSON parse errors)
/// - 404 Not Found
/// - 405 Method Not Allowed
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    // Normalize endpoint to prevent cardinality explosion
    let normalized_endpoint = normalize_endpoint(endpoint);

    let status = categorize_status_code(status_code);

    histogram!("rc_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("rc_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
///
/// Replaces dynamic segments (room ids, recording ids) with placeholders.
fn normalize_endpoint(path: &str) -> String {
    // Known static paths
    match path {
        "/" => "/".to_string(),
        "/health" => "/health".to_string(),
        "/ready" => "/ready".to_string(),
        "/metrics" => "/metrics".to_string(),
        "/api/v1/rooms" => "/api/v1/rooms".to_string(),
        "/api/v1/recordings/start" => "/api/v1/recordings/start".to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

/// Normalize paths with dynamic segments
fn normalize_dynamic_endpoint(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();

    // Room endpoints: /api/v1/rooms/{room_id}/<action>
    if path.starts_with("/api/v1/rooms/") && parts.len() == 6 {
        if let Some(action) = parts.get(5) {
            match *action {
                "participants" => return "/api/v1/rooms/{room_id}/participants".to_string(),
                "end" => return "/api/v1/rooms/{room_id}/end".to_string(),
                "active" => return "/api/v1/rooms/{room_id}/active".to_string(),
                _ => {}
            }
        }
    }

    // Active-rooms listing: /api/v1/workspaces/{workspace_id}/rooms/active
    if path.starts_with("/api/v1/workspaces/")
        && parts.len() == 7
        && parts.get(5) == Some(&"rooms")
        && parts.get(6) == Some(&"active")
    {
        return "/api/v1/workspaces/{workspace_id}/rooms/active".to_string();
    }

    // Recording endpoints
    if path.starts_with("/api/v1/recordings/") {
        // /api/v1/recordings/{recording_id}
        if parts.len() == 5 {
            return "/api/v1/recordings/{recording_id}".to_string();
        }

        if parts.len() == 6 {
            // List endpoints keyed by owner id
            match parts.get(4) {
                Some(&"workspace") => {
                    return "/api/v1/recordings/workspace/{workspace_id}".to_string()
                }
                Some(&"room") => return "/api/v1/recordings/room/{room_id}".to_string(),
                _ => {}
            }

            // Terminal transitions on a recording id
            match parts.get(5) {
                Some(&"stop") => return "/api/v1/recordings/{recording_id}/stop".to_string(),
                Some(&"fail") => return "/api/v1/recordings/{recording_id}/fail".to_string(),
                _ => {}
            }
        }
    }

    // Unknown paths normalized to "/other" to bound cardinality
    "/other".to_string()
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record database query execution
///
/// Metric: `rc_db_query_duration_seconds`, `rc_db_queries_total`
/// Labels: `operation`, `status`
///
/// Operations: insert_room, room_exists, room_is_active, end_room,
///             insert_participant, insert_recording, complete_recording,
///             fail_recording, etc.
pub fn record_db_query(operation: &str, status: &str, duration: Duration) {
    histogram!("rc_db_query_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("rc_db_queries_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // These tests execute the metric recording functions for coverage. The
    // metrics crate records to a global no-op recorder if none is installed,
    // which is sufficient here; verifying actual values would require a test
    // recorder from metrics-util.

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, Duration::from_millis(5));
        record_http_request("POST", "/api/v1/rooms", 201, Duration::from_millis(30));
        record_http_request(
            "PUT",
            "/api/v1/recordings/rec-123/stop",
            200,
            Duration::from_millis(20),
        );

        // Error cases
        record_http_request("POST", "/api/v1/rooms", 404, Duration::from_millis(10));
        record_http_request(
            "POST",
            "/api/v1/recordings/start",
            412,
            Duration::from_millis(5),
        );

        // Timeout
        record_http_request("GET", "/api/v1/rooms/r1/active", 504, Duration::from_secs(30));
    }

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(201), "success");
        assert_eq!(categorize_status_code(204), "success");

        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");

        assert_eq!(categorize_status_code(400), "error");
        assert_eq!(categorize_status_code(404), "error");
        assert_eq!(categorize_status_code(412), "error");
        assert_eq!(categorize_status_code(500), "error");
    }

    #[test]
    fn test_normalize_endpoint_known_paths() {
        assert_eq!(normalize_endpoint("/"), "/");
        assert_eq!(normalize_endpoint("/health"), "/health");
        assert_eq!(normalize_endpoint("/ready"), "/ready");
        assert_eq!(normalize_endpoint("/metrics"), "/metrics");
        assert_eq!(normalize_endpoint("/api/v1/rooms"), "/api/v1/rooms");
        assert_eq!(
            normalize_endpoint("/api/v1/recordings/start"),
            "/api/v1/recordings/start"
        );
    }

    #[test]
    fn test_normalize_endpoint_room_paths() {
        assert_eq!(
            normalize_endpoint("/api/v1/rooms/sketch-1700000000-a1b2c3d4/end"),
            "/api/v1/rooms/{room_id}/end"
        );
        assert_eq!(
            normalize_endpoint("/api/v1/rooms/r1/participants"),
            "/api/v1/rooms/{room_id}/participants"
        );
        assert_eq!(
            normalize_endpoint("/api/v1/rooms/r1/active"),
            "/api/v1/rooms/{room_id}/active"
        );
        assert_eq!(
            normalize_endpoint("/api/v1/workspaces/ws1/rooms/active"),
            "/api/v1/workspaces/{workspace_id}/rooms/active"
        );
    }

    #[test]
    fn test_normalize_endpoint_recording_paths() {
        assert_eq!(
            normalize_endpoint("/api/v1/recordings/rec-550e8400-e29b-41d4-a716-446655440000"),
            "/api/v1/recordings/{recording_id}"
        );
        assert_eq!(
            normalize_endpoint("/api/v1/recordings/rec-abc/stop"),
            "/api/v1/recordings/{recording_id}/stop"
        );
        assert_eq!(
            normalize_endpoint("/api/v1/recordings/rec-abc/fail"),
            "/api/v1/recordings/{recording_id}/fail"
        );
        assert_eq!(
            normalize_endpoint("/api/v1/recordings/workspace/ws1"),
            "/api/v1/recordings/workspace/{workspace_id}"
        );
        assert_eq!(
            normalize_endpoint("/api/v1/recordings/room/r1"),
            "/api/v1/recordings/room/{room_id}"
        );
    }

    #[test]
    fn test_normalize_endpoint_unknown_paths() {
        assert_eq!(normalize_endpoint("/unknown"), "/other");
        assert_eq!(normalize_endpoint("/api/v2/something"), "/other");
        assert_eq!(normalize_endpoint("/api/v1/rooms/r1/unknown-action"), "/other");
    }

    #[test]
    fn test_record_db_query() {
        record_db_query("insert_room", "success", Duration::from_millis(5));
        record_db_query("end_room", "success", Duration::from_millis(3));
        record_db_query("insert_participant", "success", Duration::from_millis(2));
        record_db_query("complete_recording", "error", Duration::from_millis(50));
    }
}
