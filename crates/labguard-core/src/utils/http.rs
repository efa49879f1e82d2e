//! HTTP client utilities.

use std::time::Duration;

use reqwest::Client;

/// Default per-request timeout for management API calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn user_agent() -> String {
    format!("labguard/{}", env!("CARGO_PKG_VERSION"))
}

/// Create HTTP client with the given per-request timeout.
pub fn create_client(timeout_secs: u64) -> reqwest::Result<Client> {
    base_builder(timeout_secs).build()
}

/// Shared builder with keepalive settings.
fn base_builder(timeout_secs: u64) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .tcp_nodelay(true)
        .user_agent(user_agent())
}
