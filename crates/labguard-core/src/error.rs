//! Unified error types for labguard core.

use labguard_types::{ApiError, ConfigError, CredentialError};
use serde::Serialize;
use thiserror::Error;

/// Main error type for all labguard operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Cloud API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Credentials could not be resolved or exchanged.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Operator input failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be built.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 payload (service account key data) was malformed.
    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Long-running operation finished with an error or never finished.
    #[error("Operation {name} failed: {message}")]
    Operation { name: String, message: String },
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Result type alias for labguard operations.
pub type AppResult<T> = Result<T, AppError>;
