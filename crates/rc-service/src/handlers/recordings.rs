//! Recording handlers for the Room Controller.
//!
//! Implements the recording callback and query endpoints used by the media
//! server and the audit surface:
//!
//! - `POST /api/v1/recordings/start` - Begin a recording session
//! - `PUT /api/v1/recordings/{recording_id}/stop` - Complete a recording
//! - `PUT /api/v1/recordings/{recording_id}/fail` - Report a failed capture
//! - `GET /api/v1/recordings/{recording_id}` - Fetch one recording
//! - `GET /api/v1/recordings/workspace/{workspace_id}` - List by workspace
//! - `GET /api/v1/recordings/room/{room_id}` - List by room
//!
//! The fail endpoint always returns 200: the media server calls it from its
//! own failure paths and must never have cleanup derailed by bookkeeping.

use crate::errors::RcError;
use crate::models::{
    FailRecordingRequest, RecordingResponse, StartRecordingRequest, StopRecordingRequest,
};
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/v1/recordings/start
///
/// # Response
///
/// - 201 Created: recording session created, status RECORDING
/// - 400 Bad Request: missing fields
/// - 412 Precondition Failed: room is not active
#[instrument(skip_all, name = "rc.recordings.start_handler")]
pub async fn start_recording(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRecordingRequest>,
) -> Result<(StatusCode, Json<RecordingResponse>), RcError> {
    request
        .validate()
        .map_err(|e| RcError::BadRequest(e.to_string()))?;

    let recording = state
        .recordings
        .start_recording(&request.room_id, &request.workspace_id, &request.recorder_id)
        .await?;

    Ok((StatusCode::CREATED, Json(recording.into())))
}

/// Handler for PUT /api/v1/recordings/{recording_id}/stop
///
/// Completes a recording. The body is optional; when present it may carry the
/// final file size. Stopping an already-terminal recording returns the stored
/// row unchanged.
///
/// # Response
///
/// - 200 OK: recording completed (or already terminal)
/// - 404 Not Found: recording does not exist
#[instrument(
    skip_all,
    name = "rc.recordings.stop_handler",
    fields(recording_id = %recording_id)
)]
pub async fn stop_recording(
    State(state): State<Arc<AppState>>,
    Path(recording_id): Path<String>,
    body: Option<Json<StopRecordingRequest>>,
) -> Result<Json<RecordingResponse>, RcError> {
    let file_size = body.and_then(|Json(request)| request.file_size);

    let recording = state
        .recordings
        .stop_recording(&recording_id, file_size)
        .await?;

    Ok(Json(recording.into()))
}

/// Handler for PUT /api/v1/recordings/{recording_id}/fail
///
/// Best-effort failure report. Always returns 200, even for an unknown
/// recording or an internal error; details go to the server-side log.
#[instrument(
    skip_all,
    name = "rc.recordings.fail_handler",
    fields(recording_id = %recording_id)
)]
pub async fn fail_recording(
    State(state): State<Arc<AppState>>,
    Path(recording_id): Path<String>,
    body: Option<Json<FailRecordingRequest>>,
) -> StatusCode {
    let reason = body
        .map(|Json(request)| request.reason)
        .unwrap_or_else(|| "unspecified".to_string());

    state.recordings.fail_recording(&recording_id, &reason).await;

    StatusCode::OK
}

/// Handler for GET /api/v1/recordings/{recording_id}
#[instrument(
    skip_all,
    name = "rc.recordings.get_handler",
    fields(recording_id = %recording_id)
)]
pub async fn get_recording(
    State(state): State<Arc<AppState>>,
    Path(recording_id): Path<String>,
) -> Result<Json<RecordingResponse>, RcError> {
    let recording = state.recordings.get_recording(&recording_id).await?;
    Ok(Json(recording.into()))
}

/// Handler for GET /api/v1/recordings/workspace/{workspace_id}
///
/// All recordings of a workspace, newest first. Unknown workspace yields an
/// empty list.
#[instrument(
    skip_all,
    name = "rc.recordings.list_by_workspace_handler",
    fields(workspace_id = %workspace_id)
)]
pub async fn list_recordings_by_workspace(
    State(state): State<Arc<AppState>>,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<RecordingResponse>>, RcError> {
    let recordings = state.recordings.list_by_workspace(&workspace_id).await?;
    Ok(Json(recordings.into_iter().map(Into::into).collect()))
}

/// Handler for GET /api/v1/recordings/room/{room_id}
///
/// All recordings of a room, newest first.
#[instrument(
    skip_all,
    name = "rc.recordings.list_by_room_handler",
    fields(room_id = %room_id)
)]
pub async fn list_recordings_by_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<RecordingResponse>>, RcError> {
    let recordings = state.recordings.list_by_room(&room_id).await?;
    Ok(Json(recordings.into_iter().map(Into::into).collect()))
}
