//! Google Cloud REST API errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest raw body kept when a response is not a Google error document.
const MAX_RAW_BODY: usize = 512;

/// Errors returned by (or on the way to) a Google Cloud REST API.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ApiError {
    /// Non-2xx response
    #[error("HTTP {code} {status}: {message}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Canonical status, e.g. `PERMISSION_DENIED` (may be empty)
        status: String,
        /// Provider message (`error.message`)
        message: String,
    },

    /// Request never produced a response (DNS, TLS, timeout, ...)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// 2xx response whose body could not be decoded
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

#[derive(Deserialize)]
struct ErrorDocument {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl ApiError {
    /// Build a status error from a response body, preferring the Google
    /// `{"error": {...}}` document when present.
    pub fn from_response(code: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorDocument>(body) {
            Ok(doc) => Self::Status { code, status: doc.error.status, message: doc.error.message },
            Err(_) => Self::Status {
                code,
                status: String::new(),
                message: body.trim().chars().take(MAX_RAW_BODY).collect(),
            },
        }
    }

    fn status_is(&self, wanted_code: u16, wanted_status: &[&str]) -> bool {
        match self {
            Self::Status { code, status, .. } => {
                *code == wanted_code || wanted_status.contains(&status.as_str())
            },
            _ => false,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.status_is(403, &["PERMISSION_DENIED"])
    }

    pub fn is_already_exists(&self) -> bool {
        self.status_is(409, &["ALREADY_EXISTS"])
    }

    /// The resource does not support the call (e.g. a limit without overrides).
    pub fn is_unsupported(&self) -> bool {
        match self {
            Self::Status { code, status, .. } => {
                matches!(code, 400 | 404 | 501)
                    || matches!(
                        status.as_str(),
                        "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "NOT_FOUND" | "UNIMPLEMENTED"
                    )
            },
            _ => false,
        }
    }

    /// Short provider reason suitable for a one-line report.
    pub fn reason(&self) -> String {
        match self {
            Self::Status { message, code, .. } if message.is_empty() => format!("HTTP {code}"),
            Self::Status { message, .. } => message.clone(),
            Self::Transport { message } | Self::InvalidResponse { message } => message.clone(),
        }
    }
}
