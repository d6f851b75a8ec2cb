//! HTTP request handlers for the Room Controller.

pub mod health;
pub mod metrics;
pub mod recordings;
pub mod rooms;

pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use recordings::{
    fail_recording, get_recording, list_recordings_by_room, list_recordings_by_workspace,
    start_recording, stop_recording,
};
pub use rooms::{add_participant, create_room, end_room, list_active_rooms, room_active};
