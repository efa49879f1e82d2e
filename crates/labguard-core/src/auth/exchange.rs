//! OAuth2 token exchanges: refresh-token grant, JWT bearer grant and the GCE
//! metadata server.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use labguard_types::{AccessToken, CredentialError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::file::{AuthorizedUser, ServiceAccountKeyFile};

/// Lifetime requested for service account assertions.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Assumed lifetime when a token response omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Exchange a gcloud user refresh token for an access token.
pub(crate) async fn refresh_user_token(
    http: &Client,
    endpoint: &str,
    user: &AuthorizedUser,
) -> Result<AccessToken, CredentialError> {
    let params = [
        ("client_id", user.client_id.as_str()),
        ("client_secret", user.client_secret.as_str()),
        ("refresh_token", user.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];

    let response = http
        .post(endpoint)
        .form(&params)
        .send()
        .await
        .map_err(|e| CredentialError::token_exchange(endpoint, e.to_string()))?;

    read_token_response(endpoint, response).await
}

/// Sign an RS256 assertion with the service account key and exchange it.
pub(crate) async fn service_account_token(
    http: &Client,
    endpoint: &str,
    key: &ServiceAccountKeyFile,
    scopes: &[String],
) -> Result<AccessToken, CredentialError> {
    let assertion = sign_assertion(key, endpoint, &scopes.join(" "), chrono::Utc::now().timestamp())?;
    let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

    let response = http
        .post(endpoint)
        .form(&params)
        .send()
        .await
        .map_err(|e| CredentialError::token_exchange(endpoint, e.to_string()))?;

    read_token_response(endpoint, response).await
}

/// Fetch the default service account token from the metadata server.
pub(crate) async fn metadata_token(
    http: &Client,
    endpoint: &str,
) -> Result<AccessToken, CredentialError> {
    let response = http
        .get(endpoint)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| CredentialError::token_exchange(endpoint, e.to_string()))?;

    read_token_response(endpoint, response).await
}

pub(crate) fn sign_assertion(
    key: &ServiceAccountKeyFile,
    audience: &str,
    scope: &str,
    now: i64,
) -> Result<String, CredentialError> {
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| CredentialError::Signing { message: e.to_string() })?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let claims = AssertionClaims {
        iss: &key.client_email,
        scope,
        aud: audience,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    jsonwebtoken::encode(&header, &claims, &signing_key)
        .map_err(|e| CredentialError::Signing { message: e.to_string() })
}

async fn read_token_response(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<AccessToken, CredentialError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CredentialError::token_exchange(endpoint, e.to_string()))?;

    if !status.is_success() {
        let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            },
            Err(_) => body.trim().to_string(),
        };
        return Err(CredentialError::token_exchange(
            endpoint,
            format!("HTTP {}: {}", status.as_u16(), detail),
        ));
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| CredentialError::token_exchange(endpoint, format!("bad token response: {e}")))?;

    Ok(AccessToken::new(token.access_token, token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_rejects_garbage_key() {
        let key = ServiceAccountKeyFile {
            client_email: "sa@p.iam.gserviceaccount.com".to_string(),
            private_key: "not a pem".to_string(),
            private_key_id: None,
            project_id: None,
            token_uri: None,
        };
        let result = sign_assertion(&key, "https://oauth2.googleapis.com/token", "scope", 0);
        assert!(matches!(result, Err(CredentialError::Signing { .. })));
    }
}
