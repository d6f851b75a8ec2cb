//! Room Controller models.
//!
//! Status enums, database row types, and the request/response types used by
//! the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Room status enumeration.
///
/// Rooms only ever transition IN_PROGRESS -> ENDED, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    /// Room is currently in progress.
    InProgress,

    /// Room has ended.
    Ended,
}

impl RoomStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            RoomStatus::InProgress => "IN_PROGRESS",
            RoomStatus::Ended => "ENDED",
        }
    }
}

/// Participant role within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantRole {
    Host,
    Participant,
}

impl ParticipantRole {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ParticipantRole::Host => "HOST",
            ParticipantRole::Participant => "PARTICIPANT",
        }
    }
}

/// Recording session status enumeration.
///
/// RECORDING is the only non-terminal state reachable through this service;
/// PROCESSING exists for recordings handed to an external post-processing
/// pipeline and is treated as terminal here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingStatus {
    Recording,
    Completed,
    Failed,
    Processing,
}

impl RecordingStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            RecordingStatus::Recording => "RECORDING",
            RecordingStatus::Completed => "COMPLETED",
            RecordingStatus::Failed => "FAILED",
            RecordingStatus::Processing => "PROCESSING",
        }
    }
}

// ============================================================================
// Database rows
// ============================================================================

/// Room database row.
#[derive(Debug, Clone)]
pub struct RoomRow {
    /// Caller-supplied room identifier (convention: `<type>-<timestamp>-<random8>`).
    pub room_id: String,

    /// Room display name.
    pub name: String,

    /// Workspace that owns the room.
    pub workspace_id: String,

    /// User hosting the room.
    pub host_id: String,

    /// Current room status ("IN_PROGRESS" or "ENDED").
    pub status: String,

    /// Whether recording is enabled for this room.
    pub recording_enabled: bool,

    /// When the room actually started.
    pub actual_start_time: Option<DateTime<Utc>>,

    /// When the room ended (null while in progress).
    pub actual_end_time: Option<DateTime<Utc>>,

    /// Free-form description.
    pub description: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Participant database row, unique per (room_id, user_id).
#[derive(Debug, Clone)]
pub struct ParticipantRow {
    pub room_id: String,
    pub user_id: String,
    pub role: String,
    pub active_state: bool,
    pub joined_at: DateTime<Utc>,
}

/// Recording session database row.
#[derive(Debug, Clone)]
pub struct RecordingRow {
    /// Generated recording identifier (`rec-<uuid>`).
    pub recording_id: String,

    /// Room the capture was made in.
    pub room_id: String,

    /// Workspace that owns the room.
    pub workspace_id: String,

    /// User whose client performs the capture.
    pub recorder_id: String,

    /// Derived file name (`<room_id>_<timestamp>.webm`).
    pub file_name: String,

    /// Storage path (`{base}/{workspace_id}/{room_id}/{file_name}`).
    pub file_path: String,

    /// File size in bytes, reported at stop time.
    pub file_size: Option<i64>,

    /// Whole-second duration, computed once at the terminal transition.
    pub duration_seconds: Option<i32>,

    /// Current recording status.
    pub status: String,

    /// Capture start timestamp.
    pub start_time: Option<DateTime<Utc>>,

    /// Capture end timestamp (null until terminal).
    pub end_time: Option<DateTime<Utc>>,

    /// Thumbnail path, set by an external pipeline.
    pub thumbnail_path: Option<String>,

    /// Row creation timestamp, used for list ordering.
    pub created_date: DateTime<Utc>,
}

// ============================================================================
// Room API models
// ============================================================================

/// Request to create a room.
///
/// `room_id` is caller-supplied; creating the same room twice is a no-op.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRoomRequest {
    /// Caller-supplied room identifier.
    pub room_id: String,

    /// Room display name (optional, defaults to `room-<room_id>`).
    pub name: Option<String>,

    /// Workspace the room belongs to (must exist).
    pub workspace_id: String,

    /// Hosting user (must exist).
    pub host_id: String,

    /// Session type, folded into the room description (e.g. "sketch").
    pub room_type: Option<String>,
}

impl CreateRoomRequest {
    /// Validate the request fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.room_id.trim().is_empty() {
            return Err("room_id is required");
        }

        if self.workspace_id.trim().is_empty() {
            return Err("workspace_id is required");
        }

        if self.host_id.trim().is_empty() {
            return Err("host_id is required");
        }

        Ok(())
    }
}

/// Response after creating a room (also returned on the idempotent path).
#[derive(Debug, Clone, Serialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
}

/// Request to add a participant to a room.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddParticipantRequest {
    pub user_id: String,

    /// Role for the join (optional, defaults to PARTICIPANT).
    pub role: Option<ParticipantRole>,
}

/// Response for the room-active query.
#[derive(Debug, Clone, Serialize)]
pub struct RoomActiveResponse {
    pub active: bool,
}

/// A participant as shown in the active-rooms listing.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantInfo {
    pub user_id: String,
    pub role: String,
    pub active: bool,
}

impl From<ParticipantRow> for ParticipantInfo {
    fn from(row: ParticipantRow) -> Self {
        Self {
            user_id: row.user_id,
            role: row.role,
            active: row.active_state,
        }
    }
}

/// An in-progress room with its roster, for the workspace dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveRoomSummary {
    pub room_id: String,
    pub name: String,
    pub host_id: String,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub participants: Vec<ParticipantInfo>,
    pub participant_count: usize,
}

// ============================================================================
// Recording API models
// ============================================================================

/// Request from the media server to start a recording.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartRecordingRequest {
    pub room_id: String,
    pub workspace_id: String,
    pub recorder_id: String,
}

impl StartRecordingRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.room_id.trim().is_empty() {
            return Err("room_id is required");
        }

        if self.workspace_id.trim().is_empty() {
            return Err("workspace_id is required");
        }

        if self.recorder_id.trim().is_empty() {
            return Err("recorder_id is required");
        }

        Ok(())
    }
}

/// Request from the media server to stop a recording.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StopRecordingRequest {
    /// Final file size in bytes, when the media server knows it.
    pub file_size: Option<i64>,
}

/// Request from the media server reporting a failed capture.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FailRecordingRequest {
    pub reason: String,
}

/// Recording session as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingResponse {
    pub recording_id: String,
    pub room_id: String,
    pub workspace_id: String,
    pub recorder_id: String,
    pub file_name: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i32>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    pub created_date: DateTime<Utc>,
}

impl From<RecordingRow> for RecordingResponse {
    fn from(row: RecordingRow) -> Self {
        Self {
            recording_id: row.recording_id,
            room_id: row.room_id,
            workspace_id: row.workspace_id,
            recorder_id: row.recorder_id,
            file_name: row.file_name,
            file_path: row.file_path,
            file_size: row.file_size,
            duration_seconds: row.duration_seconds,
            status: row.status,
            start_time: row.start_time,
            end_time: row.end_time,
            thumbnail_path: row.thumbnail_path,
            created_date: row.created_date,
        }
    }
}

/// Readiness check response.
///
/// Returned by the `/ready` endpoint (readiness probe).
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Database connectivity status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,

    /// Error message (generic, no infrastructure details).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
