//! HTTP routes for the Room Controller.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::{ParticipantRoster, RecordingSessionManager, RoomRegistry};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,

    /// Room lifecycle component.
    pub registry: Arc<RoomRegistry>,

    /// Participant roster component.
    pub roster: Arc<ParticipantRoster>,

    /// Recording session component.
    pub recordings: Arc<RecordingSessionManager>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe (simple "OK") - unversioned
/// - `/ready` - Readiness probe (checks DB) - unversioned
/// - `/metrics` - Prometheus metrics endpoint - unversioned
/// - `/api/v1/rooms...` - Room lifecycle endpoints
/// - `/api/v1/recordings...` - Recording callback and query endpoints
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    // Operational routes (unversioned)
    let operational_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state.clone());

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let api_routes = Router::new()
        .route("/api/v1/rooms", post(handlers::create_room))
        .route(
            "/api/v1/rooms/:room_id/participants",
            post(handlers::add_participant),
        )
        .route("/api/v1/rooms/:room_id/end", post(handlers::end_room))
        .route("/api/v1/rooms/:room_id/active", get(handlers::room_active))
        .route(
            "/api/v1/workspaces/:workspace_id/rooms/active",
            get(handlers::list_active_rooms),
        )
        .route(
            "/api/v1/recordings/start",
            post(handlers::start_recording),
        )
        .route(
            "/api/v1/recordings/:recording_id/stop",
            put(handlers::stop_recording),
        )
        .route(
            "/api/v1/recordings/:recording_id/fail",
            put(handlers::fail_recording),
        )
        .route(
            "/api/v1/recordings/:recording_id",
            get(handlers::get_recording),
        )
        .route(
            "/api/v1/recordings/workspace/:workspace_id",
            get(handlers::list_recordings_by_workspace),
        )
        .route(
            "/api/v1/recordings/room/:room_id",
            get(handlers::list_recordings_by_room),
        )
        .with_state(state);

    // Merge routes and apply global middleware layers
    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. http_metrics_middleware - Record ALL responses (outermost)
    operational_routes
        .merge(metrics_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        // HTTP metrics layer (outermost) - captures framework-level errors
        // like 415, 400, 404, 405 as well as handler responses
        .layer(middleware::from_fn(http_metrics_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Axum's State extractor requires Clone.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_config_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Config>();
    }
}
