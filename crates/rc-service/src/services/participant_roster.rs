//! Participant roster: idempotent joins.
//!
//! Joining a room twice must never error: the host-join during room
//! creation and an explicit join for the same user are both legitimate call
//! sites. The roster never removes rows; leaving a room is owned elsewhere.

use crate::errors::RcError;
use crate::models::ParticipantRole;
use crate::repositories::ParticipantsRepository;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

/// Idempotent add of a user to a room with a role.
pub struct ParticipantRoster {
    pool: PgPool,
}

impl ParticipantRoster {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a participant to a room.
    ///
    /// A duplicate (room_id, user_id) pair is a silent no-op: the composite
    /// primary key absorbs the insert race and repetition never errors.
    #[instrument(
        skip_all,
        name = "rc.roster.add_participant",
        fields(room_id = %room_id, user_id = %user_id)
    )]
    pub async fn add_participant(
        &self,
        room_id: &str,
        user_id: &str,
        role: ParticipantRole,
    ) -> Result<(), RcError> {
        let inserted =
            ParticipantsRepository::insert_participant(&self.pool, room_id, user_id, role).await?;

        if inserted {
            info!(
                target: "rc.roster",
                room_id = %room_id,
                user_id = %user_id,
                role = role.as_db_str(),
                "Participant added"
            );
        } else {
            info!(
                target: "rc.roster",
                room_id = %room_id,
                user_id = %user_id,
                "Participant already in room, join is a no-op"
            );
        }

        Ok(())
    }

    /// Transaction-scoped variant used by RoomRegistry for the host-join,
    /// so room insert and host join commit or roll back together.
    pub(crate) async fn add_participant_in(
        &self,
        conn: &mut PgConnection,
        room_id: &str,
        user_id: &str,
        role: ParticipantRole,
    ) -> Result<(), RcError> {
        let inserted =
            ParticipantsRepository::insert_participant(&mut *conn, room_id, user_id, role).await?;

        if !inserted {
            info!(
                target: "rc.roster",
                room_id = %room_id,
                user_id = %user_id,
                "Participant already in room, join is a no-op"
            );
        }

        Ok(())
    }
}
