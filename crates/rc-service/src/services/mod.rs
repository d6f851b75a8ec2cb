//! Service layer for the Room Controller.
//!
//! The three lifecycle components and the ports to external collaborators.
//!
//! # Components
//!
//! - `room_registry` - room creation, existence checks, termination
//! - `participant_roster` - idempotent participant joins
//! - `recording_manager` - the recording state machine and queries
//! - `directory` - workspace/user existence port (external directory)
//! - `notifier` - fire-and-forget notification port

pub mod directory;
pub mod notifier;
pub mod participant_roster;
pub mod recording_manager;
pub mod room_registry;

pub use directory::{Directory, PgDirectory};
pub use notifier::{LogNotifier, Notifier};
pub use participant_roster::ParticipantRoster;
pub use recording_manager::RecordingSessionManager;
pub use room_registry::RoomRegistry;

// In-memory directory for testing (exposed for integration tests)
#[allow(unused_imports)]
pub use directory::StaticDirectory;
