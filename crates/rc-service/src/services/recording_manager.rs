//! Recording session manager.
//!
//! Owns the RECORDING -> COMPLETED | FAILED state machine. Terminal
//! transitions are one-way: whichever of stop or fail lands first wins, and
//! the loser observes a no-op. Failure reporting is best-effort and never
//! returns an error to the caller.

use crate::errors::RcError;
use crate::models::RecordingRow;
use crate::repositories::RecordingsRepository;
use crate::services::{Notifier, RoomRegistry};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Recording lifecycle component.
pub struct RecordingSessionManager {
    pool: PgPool,
    registry: Arc<RoomRegistry>,
    notifier: Arc<dyn Notifier>,
    storage_base: String,
    single_active_recording: bool,
}

impl RecordingSessionManager {
    pub fn new(
        pool: PgPool,
        registry: Arc<RoomRegistry>,
        notifier: Arc<dyn Notifier>,
        storage_base: String,
        single_active_recording: bool,
    ) -> Self {
        Self {
            pool,
            registry,
            notifier,
            storage_base,
            single_active_recording,
        }
    }

    /// Start a recording session for an active room.
    ///
    /// The room must be IN_PROGRESS; starting against an ended or absent room
    /// is a precondition failure. The recording id, file name, and storage
    /// path are all derived here so the media server never dictates where
    /// captures land on disk.
    #[instrument(
        skip_all,
        name = "rc.recordings.start",
        fields(room_id = %room_id, workspace_id = %workspace_id)
    )]
    pub async fn start_recording(
        &self,
        room_id: &str,
        workspace_id: &str,
        recorder_id: &str,
    ) -> Result<RecordingRow, RcError> {
        if !self.registry.is_active(room_id).await? {
            return Err(RcError::PreconditionFailed(format!(
                "Room {room_id} is not active"
            )));
        }

        if self.single_active_recording
            && RecordingsRepository::has_active_for_room(&self.pool, room_id).await?
        {
            return Err(RcError::PreconditionFailed(format!(
                "Room {room_id} already has an active recording"
            )));
        }

        let recording_id = format!("rec-{}", Uuid::new_v4());
        let file_name = format!(
            "{}_{}.webm",
            room_id,
            Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f")
        );
        let file_path = format!(
            "{}/{}/{}/{}",
            self.storage_base.trim_end_matches('/'),
            workspace_id,
            room_id,
            file_name
        );

        let recording = RecordingsRepository::insert_recording(
            &self.pool,
            &recording_id,
            room_id,
            workspace_id,
            recorder_id,
            &file_name,
            &file_path,
        )
        .await?;

        info!(
            target: "rc.recordings",
            recording_id = %recording.recording_id,
            room_id = %room_id,
            file_path = %recording.file_path,
            "Recording started"
        );

        Ok(recording)
    }

    /// Stop a recording: RECORDING -> COMPLETED.
    ///
    /// Duration and end time are stamped by the store in the same statement
    /// as the status change. Stopping an already-terminal recording is a
    /// no-op that returns the recording as it stands; the first terminal
    /// transition always wins.
    #[instrument(skip_all, name = "rc.recordings.stop", fields(recording_id = %recording_id))]
    pub async fn stop_recording(
        &self,
        recording_id: &str,
        file_size: Option<i64>,
    ) -> Result<RecordingRow, RcError> {
        if let Some(recording) =
            RecordingsRepository::complete(&self.pool, recording_id, file_size).await?
        {
            info!(
                target: "rc.recordings",
                recording_id = %recording_id,
                duration_seconds = ?recording.duration_seconds,
                file_size = ?recording.file_size,
                "Recording completed"
            );
            self.notifier.recording_completed(&recording).await;
            return Ok(recording);
        }

        // Zero rows matched: absent, or a terminal transition got there first.
        match RecordingsRepository::get(&self.pool, recording_id).await? {
            Some(recording) => {
                info!(
                    target: "rc.recordings",
                    recording_id = %recording_id,
                    status = %recording.status,
                    "Recording already terminal, stop is a no-op"
                );
                Ok(recording)
            }
            None => Err(RcError::NotFound(format!(
                "Recording {recording_id} not found"
            ))),
        }
    }

    /// Report a failed capture: RECORDING -> FAILED, best-effort.
    ///
    /// Never returns an error. The media server calls this from its own
    /// failure paths and must not have cleanup derailed by bookkeeping.
    #[instrument(skip_all, name = "rc.recordings.fail", fields(recording_id = %recording_id))]
    pub async fn fail_recording(&self, recording_id: &str, reason: &str) {
        match RecordingsRepository::fail(&self.pool, recording_id).await {
            Ok(0) => {
                warn!(
                    target: "rc.recordings",
                    recording_id = %recording_id,
                    "Failure reported for a recording that is absent or already terminal"
                );
            }
            Ok(_) => {
                error!(
                    target: "rc.recordings",
                    recording_id = %recording_id,
                    reason = %reason,
                    "Recording failed"
                );
            }
            Err(e) => {
                error!(
                    target: "rc.recordings",
                    recording_id = %recording_id,
                    error = %e,
                    "Could not mark recording as failed"
                );
            }
        }
    }

    /// Fetch a recording by id.
    pub async fn get_recording(&self, recording_id: &str) -> Result<RecordingRow, RcError> {
        RecordingsRepository::get(&self.pool, recording_id)
            .await?
            .ok_or_else(|| RcError::NotFound(format!("Recording {recording_id} not found")))
    }

    /// All recordings of a workspace, newest first.
    pub async fn list_by_workspace(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<RecordingRow>, RcError> {
        RecordingsRepository::list_by_workspace(&self.pool, workspace_id).await
    }

    /// All recordings of a room, newest first.
    pub async fn list_by_room(&self, room_id: &str) -> Result<Vec<RecordingRow>, RcError> {
        RecordingsRepository::list_by_room(&self.pool, room_id).await
    }
}
