//! Observability for the Room Controller.

pub mod metrics;
