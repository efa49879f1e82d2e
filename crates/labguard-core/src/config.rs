//! Endpoint configuration for the Google Cloud REST APIs.

/// Base URLs of the management APIs. Overridable so tests can point every
/// client at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub service_usage: String,
    pub org_policy: String,
    pub iam: String,
    pub resource_manager: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            service_usage: "https://serviceusage.googleapis.com".to_string(),
            org_policy: "https://orgpolicy.googleapis.com".to_string(),
            iam: "https://iam.googleapis.com".to_string(),
            resource_manager: "https://cloudresourcemanager.googleapis.com".to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Route every API to one base URL.
    pub fn single(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            service_usage: base.clone(),
            org_policy: base.clone(),
            iam: base.clone(),
            resource_manager: base,
        }
    }
}
