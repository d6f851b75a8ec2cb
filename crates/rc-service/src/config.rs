//! Room Controller configuration.
//!
//! Configuration is loaded from environment variables. The database URL is
//! redacted in Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default base path recordings are stored under in object storage.
pub const DEFAULT_RECORDING_STORAGE_PATH: &str = "/var/lib/rc/recordings";

/// Room Controller configuration.
///
/// Loaded from environment variables with sensible defaults.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Base path under which recording files are laid out
    /// (`{base}/{workspace_id}/{room_id}/{file_name}`).
    pub recording_storage_path: String,

    /// When true, a room may have at most one RECORDING-status session at a
    /// time. Off by default: the media server is allowed to run multiple
    /// concurrent captures against one room.
    pub single_active_recording: bool,
}

/// Custom Debug implementation that redacts the database URL.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("recording_storage_path", &self.recording_storage_path)
            .field("single_active_recording", &self.single_active_recording)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid boolean configuration: {0}")]
    InvalidBool(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let recording_storage_path = vars
            .get("RECORDING_STORAGE_PATH")
            .cloned()
            .unwrap_or_else(|| DEFAULT_RECORDING_STORAGE_PATH.to_string());

        let single_active_recording =
            if let Some(value_str) = vars.get("SINGLE_ACTIVE_RECORDING") {
                match value_str.as_str() {
                    "true" | "1" => true,
                    "false" | "0" => false,
                    other => {
                        return Err(ConfigError::InvalidBool(format!(
                            "SINGLE_ACTIVE_RECORDING must be true/false, got '{}'",
                            other
                        )))
                    }
                }
            } else {
                false
            };

        Ok(Config {
            database_url,
            bind_address,
            recording_storage_path,
            single_active_recording,
        })
    }
}
