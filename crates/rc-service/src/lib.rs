//! Room Controller (RC) Service Library
//!
//! This library provides the lifecycle core for real-time collaboration
//! rooms:
//!
//! - Room creation, termination, and activity checks
//! - Participant roster with idempotent joins
//! - Recording session metadata and its state machine
//!
//! Media transport, transcoding, authentication, and object storage are
//! external collaborators; the media server reports recording start, stop,
//! and failure through HTTP callbacks.
//!
//! # Architecture
//!
//! The RC follows the Handler -> Service -> Repository pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Data models
//! - `observability` - Prometheus metrics
//! - `repositories` - Database access
//! - `routes` - Axum router setup
//! - `services` - Lifecycle components and external ports

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
