//! Repository layer for the Room Controller.
//!
//! One repository per entity, following the Handler -> Service -> Repository
//! architecture. Methods take a `PgExecutor` so services can run multi-step
//! operations inside one transaction.

pub mod participants;
pub mod recordings;
pub mod rooms;

pub use participants::ParticipantsRepository;
pub use recordings::RecordingsRepository;
pub use rooms::RoomsRepository;
