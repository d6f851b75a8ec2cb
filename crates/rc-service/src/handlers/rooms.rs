//! Room handlers for the Room Controller.
//!
//! Implements the room endpoints:
//!
//! - `POST /api/v1/rooms` - Create room and join the host (idempotent)
//! - `POST /api/v1/rooms/{room_id}/participants` - Add a participant (idempotent)
//! - `POST /api/v1/rooms/{room_id}/end` - End room (lenient)
//! - `GET /api/v1/rooms/{room_id}/active` - Is the room in progress
//! - `GET /api/v1/workspaces/{workspace_id}/rooms/active` - Active rooms with rosters
//!
//! # Security
//!
//! - Callers are trusted services; the transport layer owns authentication
//! - Error messages are generic to prevent information leakage

use crate::errors::RcError;
use crate::models::{
    ActiveRoomSummary, AddParticipantRequest, CreateRoomRequest, CreateRoomResponse,
    ParticipantRole, RoomActiveResponse,
};
use crate::repositories::RoomsRepository;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/v1/rooms
///
/// Create a room in the given workspace and join the host to it. Creating a
/// room that already exists is a success, so client retries and duplicate
/// deliveries stay quiet.
///
/// # Response
///
/// - 201 Created: room created, or already existed (idempotent repeat)
/// - 400 Bad Request: invalid request body
/// - 404 Not Found: workspace or host does not exist
/// - 500 Internal Server Error: database error
#[instrument(
    skip_all,
    name = "rc.rooms.create_handler",
    fields(method = "POST", endpoint = "/api/v1/rooms")
)]
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<CreateRoomResponse>), RcError> {
    // Deserialize request body manually to return 400 (not Axum's default 422)
    let request: CreateRoomRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(target: "rc.handlers.rooms", error = %e, "Invalid request body");
        RcError::BadRequest("Invalid request body".to_string())
    })?;

    request
        .validate()
        .map_err(|e| RcError::BadRequest(e.to_string()))?;

    state.registry.create_room(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            room_id: request.room_id,
        }),
    ))
}

/// Handler for POST /api/v1/rooms/{room_id}/participants
///
/// Add a user to a room. A repeated join of the same user is a no-op success.
///
/// The room is checked up front and an unknown room is rejected with 404.
/// This is a deliberate tightening of the contract: without the check the
/// insert would trip the room foreign key and surface as a 500, which gives
/// callers nothing actionable.
///
/// # Response
///
/// - 200 OK: participant added, or already present
/// - 400 Bad Request: empty user_id
/// - 404 Not Found: room does not exist
#[instrument(
    skip_all,
    name = "rc.rooms.add_participant_handler",
    fields(room_id = %room_id)
)]
pub async fn add_participant(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(request): Json<AddParticipantRequest>,
) -> Result<StatusCode, RcError> {
    if request.user_id.trim().is_empty() {
        return Err(RcError::BadRequest("user_id is required".to_string()));
    }

    if !RoomsRepository::exists(&state.pool, &room_id).await? {
        return Err(RcError::NotFound(format!("Room {room_id} not found")));
    }

    let role = request.role.unwrap_or(ParticipantRole::Participant);
    state
        .roster
        .add_participant(&room_id, &request.user_id, role)
        .await?;

    Ok(StatusCode::OK)
}

/// Handler for POST /api/v1/rooms/{room_id}/end
///
/// End a room. Ending an absent or already-ended room still returns 200 so
/// cleanup retries from crashed clients never see errors.
#[instrument(skip_all, name = "rc.rooms.end_handler", fields(room_id = %room_id))]
pub async fn end_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, RcError> {
    state.registry.end_room(&room_id).await?;
    Ok(StatusCode::OK)
}

/// Handler for GET /api/v1/rooms/{room_id}/active
///
/// Whether the room exists with status IN_PROGRESS. An unknown room is
/// simply inactive, not an error.
#[instrument(skip_all, name = "rc.rooms.active_handler", fields(room_id = %room_id))]
pub async fn room_active(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomActiveResponse>, RcError> {
    let active = state.registry.is_active(&room_id).await?;
    Ok(Json(RoomActiveResponse { active }))
}

/// Handler for GET /api/v1/workspaces/{workspace_id}/rooms/active
///
/// All in-progress rooms of a workspace with their active participants.
/// An empty workspace yields an empty list.
#[instrument(
    skip_all,
    name = "rc.rooms.list_active_handler",
    fields(workspace_id = %workspace_id)
)]
pub async fn list_active_rooms(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<ActiveRoomSummary>>, RcError> {
    let rooms = state.registry.list_active_rooms(&workspace_id).await?;
    Ok(Json(rooms))
}
