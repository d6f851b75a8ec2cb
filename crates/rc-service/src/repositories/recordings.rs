//! Recordings repository for database operations.
//!
//! Terminal transitions (COMPLETED, FAILED) are guarded on the current
//! RECORDING status: under concurrent stop/fail calls only the first
//! transition wins and the loser affects zero rows. `duration_seconds`
//! is computed in the same UPDATE as the terminal transition, so it is set
//! exactly once and only when `start_time` is present.

use crate::errors::RcError;
use crate::models::{RecordingRow, RecordingStatus};
use crate::observability::metrics;
use sqlx::{PgExecutor, PgPool, Row};
use std::time::Instant;
use tracing::instrument;

const RECORDING_COLUMNS: &str = r#"
    recording_id, room_id, workspace_id, recorder_id,
    file_name, file_path, file_size, duration_seconds,
    status, start_time, end_time, thumbnail_path, created_date
"#;

/// Recordings repository for database operations.
pub struct RecordingsRepository;

impl RecordingsRepository {
    /// Insert a recording with status RECORDING and `start_time = NOW()`.
    #[instrument(
        skip_all,
        name = "rc.repo.insert_recording",
        fields(recording_id = %recording_id, room_id = %room_id)
    )]
    pub async fn insert_recording<'e>(
        executor: impl PgExecutor<'e>,
        recording_id: &str,
        room_id: &str,
        workspace_id: &str,
        recorder_id: &str,
        file_name: &str,
        file_path: &str,
    ) -> Result<RecordingRow, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(&format!(
            r#"
            INSERT INTO recordings (
                recording_id, room_id, workspace_id, recorder_id,
                file_name, file_path, status, start_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING {RECORDING_COLUMNS}
            "#
        ))
        .bind(recording_id)
        .bind(room_id)
        .bind(workspace_id)
        .bind(recorder_id)
        .bind(file_name)
        .bind(file_path)
        .bind(RecordingStatus::Recording.as_db_str())
        .fetch_one(executor)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("insert_recording", status, start.elapsed());

        Ok(map_row_to_recording(query_result?))
    }

    /// Fetch a recording by id.
    #[instrument(skip_all, name = "rc.repo.get_recording", fields(recording_id = %recording_id))]
    pub async fn get<'e>(
        executor: impl PgExecutor<'e>,
        recording_id: &str,
    ) -> Result<Option<RecordingRow>, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(&format!(
            "SELECT {RECORDING_COLUMNS} FROM recordings WHERE recording_id = $1"
        ))
        .bind(recording_id)
        .fetch_optional(executor)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("get_recording", status, start.elapsed());

        Ok(query_result?.map(map_row_to_recording))
    }

    /// Transition a recording RECORDING -> COMPLETED.
    ///
    /// Sets `end_time = NOW()`, keeps the stored file size unless a reported
    /// value is given, and computes `duration_seconds` as the whole-second
    /// difference from `start_time` when that was recorded.
    ///
    /// Returns `None` if no RECORDING-status row matched: the recording is
    /// either absent or already terminal, and the caller distinguishes the two.
    #[instrument(skip_all, name = "rc.repo.complete_recording", fields(recording_id = %recording_id))]
    pub async fn complete<'e>(
        executor: impl PgExecutor<'e>,
        recording_id: &str,
        file_size: Option<i64>,
    ) -> Result<Option<RecordingRow>, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(&format!(
            r#"
            UPDATE recordings
            SET status = $3,
                end_time = NOW(),
                file_size = COALESCE($2, file_size),
                duration_seconds = CASE
                    WHEN start_time IS NOT NULL
                    THEN FLOOR(EXTRACT(EPOCH FROM (NOW() - start_time)))::INTEGER
                END
            WHERE recording_id = $1 AND status = $4
            RETURNING {RECORDING_COLUMNS}
            "#
        ))
        .bind(recording_id)
        .bind(file_size)
        .bind(RecordingStatus::Completed.as_db_str())
        .bind(RecordingStatus::Recording.as_db_str())
        .fetch_optional(executor)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("complete_recording", status, start.elapsed());

        Ok(query_result?.map(map_row_to_recording))
    }

    /// Transition a recording RECORDING -> FAILED and stamp `end_time`.
    ///
    /// # Returns
    ///
    /// Number of rows updated (0 if the recording is absent or already
    /// terminal).
    #[instrument(skip_all, name = "rc.repo.fail_recording", fields(recording_id = %recording_id))]
    pub async fn fail<'e>(
        executor: impl PgExecutor<'e>,
        recording_id: &str,
    ) -> Result<u64, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(
            r#"
            UPDATE recordings
            SET status = $2,
                end_time = NOW()
            WHERE recording_id = $1 AND status = $3
            "#,
        )
        .bind(recording_id)
        .bind(RecordingStatus::Failed.as_db_str())
        .bind(RecordingStatus::Recording.as_db_str())
        .execute(executor)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("fail_recording", status, start.elapsed());

        Ok(query_result?.rows_affected())
    }

    /// Check whether a room has a RECORDING-status session.
    ///
    /// Only consulted when the single-active-recording policy is enabled.
    #[instrument(skip_all, name = "rc.repo.has_active_recording", fields(room_id = %room_id))]
    pub async fn has_active_for_room<'e>(
        executor: impl PgExecutor<'e>,
        room_id: &str,
    ) -> Result<bool, RcError> {
        let start = Instant::now();

        let query_result: Result<bool, sqlx::Error> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM recordings WHERE room_id = $1 AND status = $2)",
        )
        .bind(room_id)
        .bind(RecordingStatus::Recording.as_db_str())
        .fetch_one(executor)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("has_active_recording", status, start.elapsed());

        Ok(query_result?)
    }

    /// Fetch all recordings for a workspace, newest first.
    #[instrument(skip_all, name = "rc.repo.list_recordings_by_workspace", fields(workspace_id = %workspace_id))]
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: &str,
    ) -> Result<Vec<RecordingRow>, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(&format!(
            r#"
            SELECT {RECORDING_COLUMNS}
            FROM recordings
            WHERE workspace_id = $1
            ORDER BY created_date DESC
            "#
        ))
        .bind(workspace_id)
        .fetch_all(pool)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("list_recordings_by_workspace", status, start.elapsed());

        Ok(query_result?
            .into_iter()
            .map(map_row_to_recording)
            .collect())
    }

    /// Fetch all recordings for a room, newest first.
    #[instrument(skip_all, name = "rc.repo.list_recordings_by_room", fields(room_id = %room_id))]
    pub async fn list_by_room(pool: &PgPool, room_id: &str) -> Result<Vec<RecordingRow>, RcError> {
        let start = Instant::now();

        let query_result = sqlx::query(&format!(
            r#"
            SELECT {RECORDING_COLUMNS}
            FROM recordings
            WHERE room_id = $1
            ORDER BY created_date DESC
            "#
        ))
        .bind(room_id)
        .fetch_all(pool)
        .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("list_recordings_by_room", status, start.elapsed());

        Ok(query_result?
            .into_iter()
            .map(map_row_to_recording)
            .collect())
    }
}

/// Map a database row to a RecordingRow struct.
///
/// Shared by all queries that return recording rows to avoid field-by-field
/// mapping duplication.
pub fn map_row_to_recording(row: sqlx::postgres::PgRow) -> RecordingRow {
    RecordingRow {
        recording_id: row.get("recording_id"),
        room_id: row.get("room_id"),
        workspace_id: row.get("workspace_id"),
        recorder_id: row.get("recorder_id"),
        file_name: row.get("file_name"),
        file_path: row.get("file_path"),
        file_size: row.get("file_size"),
        duration_seconds: row.get("duration_seconds"),
        status: row.get("status"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        thumbnail_path: row.get("thumbnail_path"),
        created_date: row.get("created_date"),
    }
}
