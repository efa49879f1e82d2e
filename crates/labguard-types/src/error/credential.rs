//! Credential bootstrap errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while resolving credentials or minting a token.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum CredentialError {
    /// Credential file does not exist or cannot be read
    #[error("Cannot read credential file {path}: {message}")]
    Unreadable { path: String, message: String },

    /// Credential file is not valid JSON or misses required fields
    #[error("Invalid credential file {path}: {message}")]
    Invalid { path: String, message: String },

    /// Credential file `type` not handled
    #[error("Unsupported credential type: {kind}")]
    UnsupportedType { kind: String },

    /// Signing the service account assertion failed
    #[error("Failed to sign token assertion: {message}")]
    Signing { message: String },

    /// Token endpoint (or metadata server) rejected the exchange
    #[error("Token exchange with {endpoint} failed: {message}")]
    TokenExchange { endpoint: String, message: String },
}

impl CredentialError {
    pub fn token_exchange(endpoint: &str, message: impl Into<String>) -> Self {
        Self::TokenExchange { endpoint: endpoint.to_string(), message: message.into() }
    }

    /// `invalid_grant` means the refresh token or key was revoked; re-login is required.
    pub fn is_invalid_grant(&self) -> bool {
        matches!(self, Self::TokenExchange { message, .. } if message.contains("invalid_grant"))
    }
}
