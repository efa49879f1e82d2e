//! Typed error definitions for labguard.
//!
//! All errors are serializable, displayable and matchable, so callers can
//! branch on them instead of string-matching messages.

mod api;
mod config;
mod credential;

pub use api::ApiError;
pub use config::{validate_segment, ConfigError};
pub use credential::CredentialError;
