//! Outbound notification port.
//!
//! Delivery is owned by an external notification service and is strictly
//! fire-and-forget: implementations must log their own failures and never
//! return an error into the lifecycle operations that call them.

use crate::models::RecordingRow;
use async_trait::async_trait;
use tracing::info;

/// Best-effort notifications about lifecycle events.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A room transitioned to ENDED.
    async fn room_ended(&self, room_id: &str);

    /// A recording transitioned to COMPLETED.
    async fn recording_completed(&self, recording: &RecordingRow);
}

/// Notifier that only logs.
///
/// Deployments with a real notification channel wire their own impl in at
/// process start.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn room_ended(&self, room_id: &str) {
        info!(target: "rc.notify", room_id = %room_id, "Room ended");
    }

    async fn recording_completed(&self, recording: &RecordingRow) {
        info!(
            target: "rc.notify",
            recording_id = %recording.recording_id,
            room_id = %recording.room_id,
            duration_seconds = ?recording.duration_seconds,
            "Recording completed"
        );
    }
}
