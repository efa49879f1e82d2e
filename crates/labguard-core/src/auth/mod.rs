//! Credential bootstrap.
//!
//! Credentials are resolved from an explicit [`CredentialConfig`]; only
//! [`CredentialConfig::from_env`] looks at the process environment, so tests
//! and library callers can hand in a static token or a mock token endpoint.

mod exchange;
mod file;

use std::path::PathBuf;

use labguard_types::{AccessToken, CredentialError};
use reqwest::Client;
use tokio::sync::Mutex;

use crate::utils::logger;

pub use file::{well_known_adc_path, AuthorizedUser, CredentialFile, ServiceAccountKeyFile};

/// Scope covering every management API used here.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh this many seconds before the cached token expires.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Where the access token comes from.
#[derive(Clone)]
pub enum CredentialSource {
    /// Pre-minted bearer token (e.g. `gcloud auth print-access-token`).
    AccessToken(String),
    /// `authorized_user` or `service_account` JSON file.
    File(PathBuf),
    /// GCE / Cloud Run metadata server.
    MetadataServer,
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessToken(_) => f.write_str("AccessToken([REDACTED])"),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::MetadataServer => f.write_str("MetadataServer"),
        }
    }
}

/// Explicit credential configuration passed to [`Credentials::bootstrap`].
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    pub source: CredentialSource,
    pub scopes: Vec<String>,
    /// Replaces the token endpoint named in the credential file.
    pub token_uri: Option<String>,
    pub metadata_url: String,
}

impl CredentialConfig {
    pub fn new(source: CredentialSource) -> Self {
        Self {
            source,
            scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
            token_uri: None,
            metadata_url: DEFAULT_METADATA_TOKEN_URL.to_string(),
        }
    }

    /// Resolve the source the way Google client libraries do.
    pub fn from_env() -> Self {
        let lookup = |key: &str| std::env::var(key).ok();
        Self::resolve(lookup, well_known_adc_path(lookup("CLOUDSDK_CONFIG")))
    }

    /// Resolution order: `GOOGLE_OAUTH_ACCESS_TOKEN`, then
    /// `GOOGLE_APPLICATION_CREDENTIALS`, then the gcloud ADC file when it
    /// exists, then the metadata server.
    pub fn resolve<F>(lookup: F, adc_path: Option<PathBuf>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source = if let Some(token) = non_empty("GOOGLE_OAUTH_ACCESS_TOKEN") {
            CredentialSource::AccessToken(token.trim().to_string())
        } else if let Some(path) = non_empty("GOOGLE_APPLICATION_CREDENTIALS") {
            CredentialSource::File(PathBuf::from(path))
        } else if let Some(path) = adc_path.filter(|p| p.is_file()) {
            CredentialSource::File(path)
        } else {
            CredentialSource::MetadataServer
        };

        Self::new(source)
    }

    pub fn describe(&self) -> String {
        match &self.source {
            CredentialSource::AccessToken(_) => "static access token".to_string(),
            CredentialSource::File(path) => format!("credential file {}", path.display()),
            CredentialSource::MetadataServer => "metadata server".to_string(),
        }
    }
}

enum Minter {
    Static,
    AuthorizedUser { http: Client, endpoint: String, user: AuthorizedUser },
    ServiceAccount { http: Client, endpoint: String, key: ServiceAccountKeyFile, scopes: Vec<String> },
    Metadata { http: Client, endpoint: String },
}

impl Minter {
    async fn mint(&self) -> Result<AccessToken, CredentialError> {
        match self {
            // Static tokens never expire, so this arm is not reached after bootstrap.
            Self::Static => Err(CredentialError::token_exchange("static", "token cannot be refreshed")),
            Self::AuthorizedUser { http, endpoint, user } => {
                exchange::refresh_user_token(http, endpoint, user).await
            },
            Self::ServiceAccount { http, endpoint, key, scopes } => {
                exchange::service_account_token(http, endpoint, key, scopes).await
            },
            Self::Metadata { http, endpoint } => exchange::metadata_token(http, endpoint).await,
        }
    }
}

/// Resolved credentials with a cached, self-refreshing access token.
pub struct Credentials {
    minter: Minter,
    quota_project: Option<String>,
    token: Mutex<AccessToken>,
}

impl Credentials {
    /// Resolve the configured source and mint the first token.
    ///
    /// Any failure here is fatal for the caller: nothing can be scanned or
    /// provisioned without a token.
    pub async fn bootstrap(config: &CredentialConfig, http: Client) -> Result<Self, CredentialError> {
        let (minter, quota_project) = match &config.source {
            CredentialSource::AccessToken(token) => {
                return Ok(Self::from_access_token(token.clone()));
            },
            CredentialSource::File(path) => {
                let file = CredentialFile::load(path)?;
                let quota_project = file.quota_project().map(str::to_string);
                logger::log_info(&format!(
                    "Loaded {} credentials from {}",
                    file.kind(),
                    path.display()
                ));
                let minter = match file {
                    CredentialFile::AuthorizedUser(user) => Minter::AuthorizedUser {
                        endpoint: config
                            .token_uri
                            .clone()
                            .or_else(|| user.token_uri.clone())
                            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
                        http,
                        user,
                    },
                    CredentialFile::ServiceAccount(key) => Minter::ServiceAccount {
                        endpoint: config
                            .token_uri
                            .clone()
                            .or_else(|| key.token_uri.clone())
                            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
                        http,
                        key,
                        scopes: config.scopes.clone(),
                    },
                };
                (minter, quota_project)
            },
            CredentialSource::MetadataServer => {
                (Minter::Metadata { http, endpoint: config.metadata_url.clone() }, None)
            },
        };

        let token = minter.mint().await?;
        tracing::debug!(source = %config.describe(), "Access token minted");
        Ok(Self { minter, quota_project, token: Mutex::new(token) })
    }

    /// Credentials backed by a fixed bearer token.
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self {
            minter: Minter::Static,
            quota_project: None,
            token: Mutex::new(AccessToken::static_token(token.into())),
        }
    }

    /// Project to bill API calls to (`x-goog-user-project`).
    pub fn quota_project(&self) -> Option<&str> {
        self.quota_project.as_deref()
    }

    /// Current bearer token, refreshed shortly before it expires.
    pub async fn access_token(&self) -> Result<String, CredentialError> {
        let mut cached = self.token.lock().await;
        if cached.expires_within(REFRESH_MARGIN_SECS) {
            match self.minter.mint().await {
                Ok(fresh) => {
                    tracing::debug!("Access token refreshed");
                    *cached = fresh;
                },
                Err(e) => {
                    if e.is_invalid_grant() {
                        logger::log_error(&format!(
                            "Token refresh rejected ({e}); re-run `gcloud auth application-default login`"
                        ));
                    }
                    return Err(e);
                },
            }
        }
        Ok(cached.access_token.clone())
    }
}
