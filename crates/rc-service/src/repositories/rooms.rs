//! Rooms repository for database operations.
//!
//! The `rooms` primary key on `room_id` backs the idempotent-create
//! guarantee: concurrent inserts resolve through `ON CONFLICT DO NOTHING`
//! and zero rows affected means the room already existed.
//!
//! # Security
//!
//! - All queries use parameterized statements (SQL injection safe)

use crate::errors::RcError;
use crate::models::{RoomRow, RoomStatus};
use crate::observability::metrics;
use sqlx::{PgExecutor, PgPool, Row};
use std::time::Instant;
use tracing::instrument;

/// Rooms repository for database operations.
pub struct RoomsRepository;

impl RoomsRepository {
    /// Insert a room with status IN_PROGRESS and `actual_start_time = NOW()`.
    ///
    /// Returns `true` if the row was inserted, `false` if a room with this
    /// `room_id` already existed (the idempotent path, including the case
    /// where a concurrent caller won the insert race).
    #[instrument(skip_all, name = "rc.repo.insert_room", fields(room_id = %room_id))]
    pub async fn insert_room<'e>(
        executor: impl PgExecutor<'e>,
        room_id: &str,
        name: &str,
        workspace_id: &str,
        host_id: &str,
        description: &str,
    ) -> Result<bool, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(
            r#"
            INSERT INTO rooms (
                room_id, name, workspace_id, host_id,
                status, recording_enabled, actual_start_time, description
            )
            VALUES ($1, $2, $3, $4, $5, TRUE, NOW(), $6)
            ON CONFLICT (room_id) DO NOTHING
            "#,
        )
        .bind(room_id)
        .bind(name)
        .bind(workspace_id)
        .bind(host_id)
        .bind(RoomStatus::InProgress.as_db_str())
        .bind(description)
        .execute(executor)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("insert_room", status, start.elapsed());

        Ok(query_result?.rows_affected() > 0)
    }

    /// Check whether a room exists, in any status.
    #[instrument(skip_all, name = "rc.repo.room_exists", fields(room_id = %room_id))]
    pub async fn exists<'e>(
        executor: impl PgExecutor<'e>,
        room_id: &str,
    ) -> Result<bool, RcError> {
        let start = Instant::now();

        let query_result: Result<bool, sqlx::Error> =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rooms WHERE room_id = $1)")
                .bind(room_id)
                .fetch_one(executor)
                .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("room_exists", status, start.elapsed());

        Ok(query_result?)
    }

    /// Check whether a room exists with status IN_PROGRESS.
    #[instrument(skip_all, name = "rc.repo.room_is_active", fields(room_id = %room_id))]
    pub async fn is_active<'e>(
        executor: impl PgExecutor<'e>,
        room_id: &str,
    ) -> Result<bool, RcError> {
        let start = Instant::now();

        let query_result: Result<bool, sqlx::Error> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM rooms WHERE room_id = $1 AND status = $2)",
        )
        .bind(room_id)
        .bind(RoomStatus::InProgress.as_db_str())
        .fetch_one(executor)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("room_is_active", status, start.elapsed());

        Ok(query_result?)
    }

    /// Transition a room IN_PROGRESS -> ENDED and stamp `actual_end_time`.
    ///
    /// The status guard makes the transition one-way: an already-ended or
    /// missing room affects zero rows, which the caller treats leniently.
    ///
    /// # Returns
    ///
    /// Number of rows updated (0 or 1).
    #[instrument(skip_all, name = "rc.repo.end_room", fields(room_id = %room_id))]
    pub async fn end_room<'e>(
        executor: impl PgExecutor<'e>,
        room_id: &str,
    ) -> Result<u64, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(
            r#"
            UPDATE rooms
            SET status = $2,
                actual_end_time = NOW(),
                updated_at = NOW()
            WHERE room_id = $1 AND status = $3
            "#,
        )
        .bind(room_id)
        .bind(RoomStatus::Ended.as_db_str())
        .bind(RoomStatus::InProgress.as_db_str())
        .execute(executor)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("end_room", status, start.elapsed());

        Ok(query_result?.rows_affected())
    }

    /// Fetch all IN_PROGRESS rooms for a workspace.
    #[instrument(skip_all, name = "rc.repo.list_active_rooms", fields(workspace_id = %workspace_id))]
    pub async fn list_active_by_workspace(
        pool: &PgPool,
        workspace_id: &str,
    ) -> Result<Vec<RoomRow>, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(
            r#"
            SELECT room_id, name, workspace_id, host_id, status,
                   recording_enabled, actual_start_time, actual_end_time,
                   description, created_at, updated_at
            FROM rooms
            WHERE workspace_id = $1 AND status = $2
            ORDER BY actual_start_time DESC
            "#,
        )
        .bind(workspace_id)
        .bind(RoomStatus::InProgress.as_db_str())
        .fetch_all(pool)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("list_active_rooms", status, start.elapsed());

        Ok(query_result?.into_iter().map(map_row_to_room).collect())
    }
}

/// Map a database row to a RoomRow struct.
pub fn map_row_to_room(row: sqlx::postgres::PgRow) -> RoomRow {
    RoomRow {
        room_id: row.get("room_id"),
        name: row.get("name"),
        workspace_id: row.get("workspace_id"),
        host_id: row.get("host_id"),
        status: row.get("status"),
        recording_enabled: row.get("recording_enabled"),
        actual_start_time: row.get("actual_start_time"),
        actual_end_time: row.get("actual_end_time"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
