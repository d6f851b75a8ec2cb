//! Room registry: creation, existence checks, and termination.
//!
//! Creation is idempotent on the caller-supplied `room_id`. Termination is
//! lenient: ending a room that is absent or already ended is reported as
//! success so retried end requests never surface errors to clients.

use crate::errors::RcError;
use crate::models::{ActiveRoomSummary, CreateRoomRequest, ParticipantRole, RoomRow};
use crate::repositories::{ParticipantsRepository, RoomsRepository};
use crate::services::{Directory, Notifier, ParticipantRoster};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Room lifecycle component.
pub struct RoomRegistry {
    pool: PgPool,
    directory: Arc<dyn Directory>,
    roster: Arc<ParticipantRoster>,
    notifier: Arc<dyn Notifier>,
}

impl RoomRegistry {
    pub fn new(
        pool: PgPool,
        directory: Arc<dyn Directory>,
        roster: Arc<ParticipantRoster>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            pool,
            directory,
            roster,
            notifier,
        }
    }

    /// Create a room and join the host to it, atomically.
    ///
    /// If a room with this `room_id` already exists (in any status), the call
    /// is a no-op success. The workspace and host are checked against the
    /// directory before anything is written; either missing is a NotFound.
    ///
    /// The pre-check below is a fast path only. The real idempotency guard is
    /// the `ON CONFLICT DO NOTHING` on the insert, which also resolves the
    /// race where two callers create the same room concurrently.
    #[instrument(
        skip_all,
        name = "rc.rooms.create",
        fields(room_id = %request.room_id, workspace_id = %request.workspace_id)
    )]
    pub async fn create_room(&self, request: &CreateRoomRequest) -> Result<(), RcError> {
        if RoomsRepository::exists(&self.pool, &request.room_id).await? {
            info!(
                target: "rc.rooms",
                room_id = %request.room_id,
                "Room already exists, create is a no-op"
            );
            return Ok(());
        }

        if !self.directory.workspace_exists(&request.workspace_id).await? {
            return Err(RcError::NotFound(format!(
                "Workspace {} not found",
                request.workspace_id
            )));
        }

        if !self.directory.user_exists(&request.host_id).await? {
            return Err(RcError::NotFound(format!(
                "User {} not found",
                request.host_id
            )));
        }

        let name = request
            .name
            .clone()
            .unwrap_or_else(|| format!("room-{}", request.room_id));
        let description = match &request.room_type {
            Some(room_type) => format!("{room_type} session"),
            None => "collaboration session".to_string(),
        };

        let mut tx = self.pool.begin().await?;

        let inserted = RoomsRepository::insert_room(
            &mut *tx,
            &request.room_id,
            &name,
            &request.workspace_id,
            &request.host_id,
            &description,
        )
        .await?;

        if !inserted {
            // Lost the create race; the winner owns the host join too.
            tx.rollback().await?;
            info!(
                target: "rc.rooms",
                room_id = %request.room_id,
                "Room created concurrently, create is a no-op"
            );
            return Ok(());
        }

        self.roster
            .add_participant_in(&mut tx, &request.room_id, &request.host_id, ParticipantRole::Host)
            .await?;

        tx.commit().await?;

        info!(
            target: "rc.rooms",
            room_id = %request.room_id,
            workspace_id = %request.workspace_id,
            host_id = %request.host_id,
            "Room created"
        );

        Ok(())
    }

    /// End a room.
    ///
    /// Lenient contract: an absent or already-ended room logs a warning and
    /// still reports success, so crash-recovery retries stay quiet.
    #[instrument(skip_all, name = "rc.rooms.end", fields(room_id = %room_id))]
    pub async fn end_room(&self, room_id: &str) -> Result<(), RcError> {
        let updated = RoomsRepository::end_room(&self.pool, room_id).await?;

        if updated == 0 {
            warn!(
                target: "rc.rooms",
                room_id = %room_id,
                "End requested for a room that is absent or already ended"
            );
            return Ok(());
        }

        info!(target: "rc.rooms", room_id = %room_id, "Room ended");
        self.notifier.room_ended(room_id).await;

        Ok(())
    }

    /// Whether the room exists with status IN_PROGRESS.
    pub async fn is_active(&self, room_id: &str) -> Result<bool, RcError> {
        RoomsRepository::is_active(&self.pool, room_id).await
    }

    /// All in-progress rooms of a workspace with their active rosters.
    #[instrument(skip_all, name = "rc.rooms.list_active", fields(workspace_id = %workspace_id))]
    pub async fn list_active_rooms(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<ActiveRoomSummary>, RcError> {
        let rooms = RoomsRepository::list_active_by_workspace(&self.pool, workspace_id).await?;

        let mut summaries = Vec::with_capacity(rooms.len());
        for room in rooms {
            summaries.push(self.summarize(room).await?);
        }

        Ok(summaries)
    }

    async fn summarize(&self, room: RoomRow) -> Result<ActiveRoomSummary, RcError> {
        let participants =
            ParticipantsRepository::list_active_by_room(&self.pool, &room.room_id).await?;

        Ok(ActiveRoomSummary {
            room_id: room.room_id,
            name: room.name,
            host_id: room.host_id,
            actual_start_time: room.actual_start_time,
            participant_count: participants.len(),
            participants: participants.into_iter().map(Into::into).collect(),
        })
    }
}
