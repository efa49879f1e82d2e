//! Logging wrappers for messages built with `format!` at the call site.
//!
//! Everything is emitted under the `labguard` target so `RUST_LOG=labguard=debug`
//! selects it regardless of module path.

use tracing::{error, info, warn};

pub(crate) fn log_info(message: &str) {
    info!(target: "labguard", "{message}");
}

pub(crate) fn log_warn(message: &str) {
    warn!(target: "labguard", "{message}");
}

pub(crate) fn log_error(message: &str) {
    error!(target: "labguard", "{message}");
}
