//! Workspace/user directory port.
//!
//! The workspace and member directory is owned by another service; this core
//! only needs existence answers for its creation pre-checks. The port keeps
//! RoomRegistry testable without a populated directory.

use crate::errors::RcError;
use crate::observability::metrics;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Instant;

/// Existence lookups against the workspace/member directory.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Returns true iff the workspace exists.
    async fn workspace_exists(&self, workspace_id: &str) -> Result<bool, RcError>;

    /// Returns true iff the user exists.
    async fn user_exists(&self, user_id: &str) -> Result<bool, RcError>;
}

/// Directory backed by the shared relational store.
///
/// Reads the externally-owned `workspaces` and `users` tables; this service
/// never writes them.
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for PgDirectory {
    async fn workspace_exists(&self, workspace_id: &str) -> Result<bool, RcError> {
        let start = Instant::now();

        let query_result: Result<bool, sqlx::Error> =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM workspaces WHERE workspace_id = $1)")
                .bind(workspace_id)
                .fetch_one(&self.pool)
                .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("workspace_exists", status, start.elapsed());

        Ok(query_result?)
    }

    async fn user_exists(&self, user_id: &str) -> Result<bool, RcError> {
        let start = Instant::now();

        let query_result: Result<bool, sqlx::Error> =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await;

        let status = if query_result.is_ok() {
            "success"
        } else {
            "error"
        };
        metrics::record_db_query("user_exists", status, start.elapsed());

        Ok(query_result?)
    }
}

/// In-memory directory for tests: knows exactly the ids it was given.
pub struct StaticDirectory {
    workspaces: Vec<String>,
    users: Vec<String>,
}

impl StaticDirectory {
    pub fn new(workspaces: &[&str], users: &[&str]) -> Self {
        Self {
            workspaces: workspaces.iter().map(|s| s.to_string()).collect(),
            users: users.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn workspace_exists(&self, workspace_id: &str) -> Result<bool, RcError> {
        Ok(self.workspaces.iter().any(|w| w == workspace_id))
    }

    async fn user_exists(&self, user_id: &str) -> Result<bool, RcError> {
        Ok(self.users.iter().any(|u| u == user_id))
    }
}
