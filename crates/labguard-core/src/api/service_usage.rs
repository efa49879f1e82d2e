//! Service Usage v1beta1 consumer quota client.

use async_trait::async_trait;
use labguard_types::models::{MetricsPage, NewOverride, OverridesPage};
use labguard_types::ApiError;

use super::{GoogleHttp, QuotaApi};

/// `BASIC` omits per-bucket producer/admin override details we never read.
const METRICS_VIEW: &str = "BASIC";

/// [`QuotaApi`] over `serviceusage.googleapis.com/v1beta1`.
#[derive(Clone)]
pub struct ServiceUsageClient {
    transport: GoogleHttp,
    base_url: String,
}

impl ServiceUsageClient {
    pub fn new(transport: GoogleHttp, base_url: impl Into<String>) -> Self {
        Self { transport, base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    fn url(&self, resource: &str, collection: &str) -> String {
        format!("{}/v1beta1/{}/{}", self.base_url, resource.trim_start_matches('/'), collection)
    }
}

#[async_trait]
impl QuotaApi for ServiceUsageClient {
    async fn list_metrics(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> Result<MetricsPage, ApiError> {
        let mut query = vec![("view", METRICS_VIEW)];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        tracing::debug!(parent, page_token, "Listing consumer quota metrics");
        self.transport.get(&self.url(parent, "consumerQuotaMetrics"), &query).await
    }

    async fn list_overrides(
        &self,
        limit: &str,
        page_token: Option<&str>,
    ) -> Result<OverridesPage, ApiError> {
        let query: Vec<(&str, &str)> = page_token.map(|t| ("pageToken", t)).into_iter().collect();
        self.transport.get(&self.url(limit, "consumerOverrides"), &query).await
    }

    async fn create_override(
        &self,
        limit: &str,
        body: &NewOverride,
        force: bool,
    ) -> Result<(), ApiError> {
        let force = if force { "true" } else { "false" };
        // Returns a long-running operation; the override applies without waiting on it.
        let _operation: serde_json::Value = self
            .transport
            .post(&self.url(limit, "consumerOverrides"), &[("force", force)], body)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::Credentials;

    #[test]
    fn test_url_keeps_escaped_limit_names() {
        let transport =
            GoogleHttp::new(reqwest::Client::new(), Arc::new(Credentials::from_access_token("t")));
        let client = ServiceUsageClient::new(transport, "https://serviceusage.googleapis.com/");
        let limit = "projects/1/services/aiplatform.googleapis.com/consumerQuotaMetrics/m/limits/%2Fmin%2Fproject%2Fbase_model";
        assert_eq!(
            client.url(limit, "consumerOverrides"),
            format!("https://serviceusage.googleapis.com/v1beta1/{limit}/consumerOverrides")
        );
    }
}
