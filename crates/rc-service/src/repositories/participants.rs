//! Participants repository for database operations.
//!
//! The composite primary key on (room_id, user_id) backs the idempotent-join
//! guarantee: a duplicate join resolves through `ON CONFLICT DO NOTHING`
//! rather than surfacing a constraint violation.

use crate::errors::RcError;
use crate::models::{ParticipantRole, ParticipantRow};
use crate::observability::metrics;
use sqlx::{PgExecutor, Row};
use std::time::Instant;
use tracing::instrument;

/// Participants repository for database operations.
pub struct ParticipantsRepository;

impl ParticipantsRepository {
    /// Insert a participant with `active_state = true`.
    ///
    /// Returns `true` if the row was inserted, `false` if the
    /// (room_id, user_id) pair already existed.
    #[instrument(
        skip_all,
        name = "rc.repo.insert_participant",
        fields(room_id = %room_id, user_id = %user_id)
    )]
    pub async fn insert_participant<'e>(
        executor: impl PgExecutor<'e>,
        room_id: &str,
        user_id: &str,
        role: ParticipantRole,
    ) -> Result<bool, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(
            r#"
            INSERT INTO room_participants (room_id, user_id, role, active_state)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (room_id, user_id) DO NOTHING
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .bind(role.as_db_str())
        .execute(executor)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("insert_participant", status, start.elapsed());

        Ok(query_result?.rows_affected() > 0)
    }

    /// Fetch the active participants of a room.
    #[instrument(skip_all, name = "rc.repo.list_participants", fields(room_id = %room_id))]
    pub async fn list_active_by_room<'e>(
        executor: impl PgExecutor<'e>,
        room_id: &str,
    ) -> Result<Vec<ParticipantRow>, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(
            r#"
            SELECT room_id, user_id, role, active_state, joined_at
            FROM room_participants
            WHERE room_id = $1 AND active_state = TRUE
            ORDER BY joined_at
            "#,
        )
        .bind(room_id)
        .fetch_all(executor)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("list_participants", status, start.elapsed());

        Ok(query_result?
            .into_iter()
            .map(map_row_to_participant)
            .collect())
    }
}

/// Map a database row to a ParticipantRow struct.
pub fn map_row_to_participant(row: sqlx::postgres::PgRow) -> ParticipantRow {
    ParticipantRow {
        room_id: row.get("room_id"),
        user_id: row.get("user_id"),
        role: row.get("role"),
        active_state: row.get("active_state"),
        joined_at: row.get("joined_at"),
    }
}
