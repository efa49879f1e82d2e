//! OAuth access token model.

use serde::{Deserialize, Serialize};

/// Bearer token used against Google Cloud REST APIs.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessToken {
    /// OAuth access token
    pub access_token: String,
    /// Absolute timestamp when token expires; `None` for tokens of unknown lifetime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_timestamp: Option<i64>,
    /// Token type (usually "Bearer")
    pub token_type: String,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("expiry_timestamp", &self.expiry_timestamp)
            .field("token_type", &self.token_type)
            .finish()
    }
}

impl AccessToken {
    /// Token valid for `expires_in` seconds from now.
    pub fn new(access_token: String, expires_in: i64) -> Self {
        let expiry_timestamp = chrono::Utc::now().timestamp().saturating_add(expires_in);
        Self {
            access_token,
            expiry_timestamp: Some(expiry_timestamp),
            token_type: "Bearer".to_string(),
        }
    }

    /// Token supplied by the operator; never refreshed.
    pub fn static_token(access_token: String) -> Self {
        Self { access_token, expiry_timestamp: None, token_type: "Bearer".to_string() }
    }

    /// Check if the token will expire within the given seconds.
    pub fn expires_within(&self, seconds: i64) -> bool {
        self.expiry_timestamp
            .is_some_and(|exp| chrono::Utc::now().timestamp().saturating_add(seconds) >= exp)
    }
}
