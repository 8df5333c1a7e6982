//! Error types for the HTTP boundary and configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single backend request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The server answered with a non-2xx status
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The request did not complete in time
    #[error("Request timed out ({0}s)")]
    Timeout(u64),

    /// Connection, TLS or body transfer failure
    #[error("Connection failed: {0}")]
    Transport(String),

    /// The body did not match the expected schema
    #[error("Malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

impl ApiError {
    /// Message shown to the user. Non-2xx statuses collapse into the
    /// per-endpoint fallback text, everything else keeps its own wording.
    pub fn display_message(&self, status_fallback: &str) -> String {
        match self {
            ApiError::Status { .. } => status_fallback.to_string(),
            other => other.to_string(),
        }
    }
}

/// Problems reading or validating the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
