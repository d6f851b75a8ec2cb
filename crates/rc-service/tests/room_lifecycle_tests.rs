//! Integration tests for the room lifecycle endpoints.
//!
//! Covers:
//! - Idempotent room creation (one row, repeat is a quiet success)
//! - Directory pre-checks (unknown workspace/host are 404)
//! - Idempotent participant joins
//! - Lenient room termination
//! - Activity checks and the active-rooms listing
//!
//! Tests use the sqlx test macro for database setup with migrations and
//! drive the full router with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rc_service::config::Config;
use rc_service::observability::metrics::init_metrics_recorder;
use rc_service::routes::{self, AppState};
use rc_service::services::{
    LogNotifier, ParticipantRoster, PgDirectory, RecordingSessionManager, RoomRegistry,
};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tower::ServiceExt;

/// Global metrics handle for test routers (the Prometheus recorder can only
/// be installed once per process).
static TEST_METRICS_HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
    OnceLock::new();

fn get_test_metrics_handle() -> metrics_exporter_prometheus::PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder().unwrap_or_else(|_| {
                metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle()
            })
        })
        .clone()
}

fn test_app(pool: PgPool) -> Router {
    let vars = HashMap::from([(
        "DATABASE_URL".to_string(),
        "postgresql://test/test".to_string(),
    )]);
    let config = Config::from_vars(&vars).expect("test config should load");

    let directory = Arc::new(PgDirectory::new(pool.clone()));
    let notifier = Arc::new(LogNotifier);
    let roster = Arc::new(ParticipantRoster::new(pool.clone()));
    let registry = Arc::new(RoomRegistry::new(
        pool.clone(),
        directory,
        roster.clone(),
        notifier.clone(),
    ));
    let recordings = Arc::new(RecordingSessionManager::new(
        pool.clone(),
        registry.clone(),
        notifier,
        config.recording_storage_path.clone(),
        config.single_active_recording,
    ));

    let state = Arc::new(AppState {
        pool,
        config,
        registry,
        roster,
        recordings,
    });

    routes::build_routes(state, get_test_metrics_handle())
}

async fn read_body_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builder should succeed")
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("request builder should succeed")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request builder should succeed")
}

// ============================================================================
// Database Fixtures
// ============================================================================

async fn create_test_workspace(pool: &PgPool, workspace_id: &str) {
    sqlx::query("INSERT INTO workspaces (workspace_id, name) VALUES ($1, $2)")
        .bind(workspace_id)
        .bind(format!("Workspace {workspace_id}"))
        .execute(pool)
        .await
        .expect("Failed to create test workspace");
}

async fn create_test_user(pool: &PgPool, user_id: &str) {
    sqlx::query("INSERT INTO users (user_id, display_name) VALUES ($1, $2)")
        .bind(user_id)
        .bind(format!("User {user_id}"))
        .execute(pool)
        .await
        .expect("Failed to create test user");
}

fn create_room_body(room_id: &str, workspace_id: &str, host_id: &str) -> serde_json::Value {
    serde_json::json!({
        "room_id": room_id,
        "workspace_id": workspace_id,
        "host_id": host_id,
        "room_type": "sketch",
    })
}

async fn room_count(pool: &PgPool, room_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM rooms WHERE room_id = $1")
        .bind(room_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count rooms")
}

// ============================================================================
// Room Creation
// ============================================================================

#[sqlx::test]
async fn test_create_room_happy_path(pool: PgPool) -> Result<()> {
    let app = test_app(pool.clone());
    create_test_workspace(&pool, "ws1").await;
    create_test_user(&pool, "host1").await;

    let response = app
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("sketch-1700000000-a1b2c3d4", "ws1", "host1"),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_body_json(response.into_body()).await;
    assert_eq!(body["room_id"], "sketch-1700000000-a1b2c3d4");

    let row = sqlx::query("SELECT status, actual_start_time FROM rooms WHERE room_id = $1")
        .bind("sketch-1700000000-a1b2c3d4")
        .fetch_one(&pool)
        .await?;
    assert_eq!(row.get::<String, _>("status"), "IN_PROGRESS");
    assert!(row
        .get::<Option<chrono::DateTime<chrono::Utc>>, _>("actual_start_time")
        .is_some());

    // The host is joined with role HOST in the same transaction
    let host_role: String = sqlx::query_scalar(
        "SELECT role FROM room_participants WHERE room_id = $1 AND user_id = $2",
    )
    .bind("sketch-1700000000-a1b2c3d4")
    .bind("host1")
    .fetch_one(&pool)
    .await?;
    assert_eq!(host_role, "HOST");

    Ok(())
}

#[sqlx::test]
async fn test_create_room_is_idempotent(pool: PgPool) -> Result<()> {
    let app = test_app(pool.clone());
    create_test_workspace(&pool, "ws1").await;
    create_test_user(&pool, "host1").await;

    let body = create_room_body("room-1", "ws1", "host1");

    let first = app.clone().oneshot(post_json("/api/v1/rooms", body.clone())).await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.oneshot(post_json("/api/v1/rooms", body)).await?;
    assert_eq!(second.status(), StatusCode::CREATED);

    assert_eq!(room_count(&pool, "room-1").await, 1);

    Ok(())
}

#[sqlx::test]
async fn test_create_room_unknown_workspace(pool: PgPool) -> Result<()> {
    let app = test_app(pool.clone());
    create_test_user(&pool, "host1").await;

    let response = app
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("room-1", "no-such-ws", "host1"),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_body_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    assert_eq!(room_count(&pool, "room-1").await, 0);

    Ok(())
}

#[sqlx::test]
async fn test_create_room_unknown_host(pool: PgPool) -> Result<()> {
    let app = test_app(pool.clone());
    create_test_workspace(&pool, "ws1").await;

    let response = app
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("room-1", "ws1", "no-such-user"),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(room_count(&pool, "room-1").await, 0);

    Ok(())
}

#[sqlx::test]
async fn test_create_room_invalid_body_is_400(pool: PgPool) -> Result<()> {
    let app = test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/rooms")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .expect("request builder should succeed");

    let response = app.oneshot(request).await?;

    // Manual deserialization yields 400, not Axum's default 422
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[sqlx::test]
async fn test_create_room_blank_room_id_is_400(pool: PgPool) -> Result<()> {
    let app = test_app(pool);

    let response = app
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("   ", "ws1", "host1"),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

// ============================================================================
// Participant Joins
// ============================================================================

#[sqlx::test]
async fn test_add_participant_is_idempotent(pool: PgPool) -> Result<()> {
    let app = test_app(pool.clone());
    create_test_workspace(&pool, "ws1").await;
    create_test_user(&pool, "host1").await;
    create_test_user(&pool, "guest1").await;

    let create = app
        .clone()
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("room-1", "ws1", "host1"),
        ))
        .await?;
    assert_eq!(create.status(), StatusCode::CREATED);

    let join_body = serde_json::json!({ "user_id": "guest1" });

    let first = app
        .clone()
        .oneshot(post_json("/api/v1/rooms/room-1/participants", join_body.clone()))
        .await?;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(post_json("/api/v1/rooms/room-1/participants", join_body))
        .await?;
    assert_eq!(second.status(), StatusCode::OK);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM room_participants WHERE room_id = $1 AND user_id = $2",
    )
    .bind("room-1")
    .bind("guest1")
    .fetch_one(&pool)
    .await?;
    assert_eq!(count, 1);

    Ok(())
}

#[sqlx::test]
async fn test_add_participant_unknown_room(pool: PgPool) -> Result<()> {
    let app = test_app(pool);

    let response = app
        .oneshot(post_json(
            "/api/v1/rooms/no-such-room/participants",
            serde_json::json!({ "user_id": "guest1" }),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[sqlx::test]
async fn test_add_participant_with_host_role(pool: PgPool) -> Result<()> {
    let app = test_app(pool.clone());
    create_test_workspace(&pool, "ws1").await;
    create_test_user(&pool, "host1").await;
    create_test_user(&pool, "cohost").await;

    app.clone()
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("room-1", "ws1", "host1"),
        ))
        .await?;

    let response = app
        .oneshot(post_json(
            "/api/v1/rooms/room-1/participants",
            serde_json::json!({ "user_id": "cohost", "role": "HOST" }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let role: String = sqlx::query_scalar(
        "SELECT role FROM room_participants WHERE room_id = $1 AND user_id = $2",
    )
    .bind("room-1")
    .bind("cohost")
    .fetch_one(&pool)
    .await?;
    assert_eq!(role, "HOST");

    Ok(())
}

// ============================================================================
// Room Termination
// ============================================================================

#[sqlx::test]
async fn test_end_room_happy_path(pool: PgPool) -> Result<()> {
    let app = test_app(pool.clone());
    create_test_workspace(&pool, "ws1").await;
    create_test_user(&pool, "host1").await;

    app.clone()
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("room-1", "ws1", "host1"),
        ))
        .await?;

    let response = app.clone().oneshot(post_empty("/api/v1/rooms/room-1/end")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let row = sqlx::query("SELECT status, actual_end_time FROM rooms WHERE room_id = $1")
        .bind("room-1")
        .fetch_one(&pool)
        .await?;
    assert_eq!(row.get::<String, _>("status"), "ENDED");
    assert!(row
        .get::<Option<chrono::DateTime<chrono::Utc>>, _>("actual_end_time")
        .is_some());

    // The room is no longer active
    let active = app.oneshot(get("/api/v1/rooms/room-1/active")).await?;
    let body = read_body_json(active.into_body()).await;
    assert_eq!(body["active"], false);

    Ok(())
}

#[sqlx::test]
async fn test_end_room_is_lenient(pool: PgPool) -> Result<()> {
    let app = test_app(pool.clone());
    create_test_workspace(&pool, "ws1").await;
    create_test_user(&pool, "host1").await;

    // Ending a room that never existed still reports success
    let absent = app
        .clone()
        .oneshot(post_empty("/api/v1/rooms/no-such-room/end"))
        .await?;
    assert_eq!(absent.status(), StatusCode::OK);

    // Ending twice leaves the first end_time untouched
    app.clone()
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("room-1", "ws1", "host1"),
        ))
        .await?;
    app.clone().oneshot(post_empty("/api/v1/rooms/room-1/end")).await?;

    let first_end: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT actual_end_time FROM rooms WHERE room_id = $1")
            .bind("room-1")
            .fetch_one(&pool)
            .await?;

    let repeat = app.oneshot(post_empty("/api/v1/rooms/room-1/end")).await?;
    assert_eq!(repeat.status(), StatusCode::OK);

    let second_end: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT actual_end_time FROM rooms WHERE room_id = $1")
            .bind("room-1")
            .fetch_one(&pool)
            .await?;
    assert_eq!(first_end, second_end);

    Ok(())
}

// ============================================================================
// Activity Queries
// ============================================================================

#[sqlx::test]
async fn test_room_active_states(pool: PgPool) -> Result<()> {
    let app = test_app(pool.clone());
    create_test_workspace(&pool, "ws1").await;
    create_test_user(&pool, "host1").await;

    // Unknown room is inactive, not an error
    let unknown = app.clone().oneshot(get("/api/v1/rooms/no-such-room/active")).await?;
    assert_eq!(unknown.status(), StatusCode::OK);
    let body = read_body_json(unknown.into_body()).await;
    assert_eq!(body["active"], false);

    app.clone()
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("room-1", "ws1", "host1"),
        ))
        .await?;

    let active = app.oneshot(get("/api/v1/rooms/room-1/active")).await?;
    let body = read_body_json(active.into_body()).await;
    assert_eq!(body["active"], true);

    Ok(())
}

#[sqlx::test]
async fn test_list_active_rooms(pool: PgPool) -> Result<()> {
    let app = test_app(pool.clone());
    create_test_workspace(&pool, "ws1").await;
    create_test_user(&pool, "host1").await;
    create_test_user(&pool, "guest1").await;

    app.clone()
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("room-1", "ws1", "host1"),
        ))
        .await?;
    app.clone()
        .oneshot(post_json(
            "/api/v1/rooms",
            create_room_body("room-2", "ws1", "host1"),
        ))
        .await?;
    app.clone()
        .oneshot(post_json(
            "/api/v1/rooms/room-1/participants",
            serde_json::json!({ "user_id": "guest1" }),
        ))
        .await?;

    // An ended room drops out of the listing
    app.clone().oneshot(post_empty("/api/v1/rooms/room-2/end")).await?;

    let response = app
        .oneshot(get("/api/v1/workspaces/ws1/rooms/active"))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_body_json(response.into_body()).await;
    let rooms = body.as_array().expect("body should be an array");
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["room_id"], "room-1");
    assert_eq!(rooms[0]["participant_count"], 2);

    Ok(())
}

#[sqlx::test]
async fn test_health_and_readiness(pool: PgPool) -> Result<()> {
    let app = test_app(pool);

    let health = app.clone().oneshot(get("/health")).await?;
    assert_eq!(health.status(), StatusCode::OK);

    let ready = app.oneshot(get("/ready")).await?;
    assert_eq!(ready.status(), StatusCode::OK);
    let body = read_body_json(ready.into_body()).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "healthy");

    Ok(())
}
