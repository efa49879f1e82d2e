//! HTTP client construction and logging helpers.

pub mod http;
pub mod logger;
