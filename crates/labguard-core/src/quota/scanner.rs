//! Lazy paginated listing of consumer quota metrics.

use async_stream::try_stream;
use futures::Stream;
use labguard_types::models::next_token;
use labguard_types::{ApiError, QuotaMetric};

use crate::api::QuotaApi;

/// Walks `consumerQuotaMetrics` of one service.
///
/// Each call to [`MetricScanner::metrics`] starts a fresh pass from the first
/// page. A page is only requested once every metric of the previous page has
/// been pulled.
pub struct MetricScanner<'a> {
    api: &'a dyn QuotaApi,
    parent: String,
}

impl<'a> MetricScanner<'a> {
    /// `parent` is `projects/{project}/services/{service}`.
    pub fn new(api: &'a dyn QuotaApi, parent: impl Into<String>) -> Self {
        Self { api, parent: parent.into() }
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Finite stream of metrics. A listing error is yielded once and ends the stream.
    pub fn metrics(&self) -> impl Stream<Item = Result<QuotaMetric, ApiError>> + Send + '_ {
        let api = self.api;
        let parent = self.parent.as_str();

        try_stream! {
            let mut page_token: Option<String> = None;
            let mut pages = 0usize;

            loop {
                let page = api.list_metrics(parent, page_token.as_deref()).await?;
                pages += 1;
                tracing::debug!(parent, page = pages, metrics = page.metrics.len(), "Fetched metrics page");

                for metric in page.metrics {
                    yield metric;
                }

                match next_token(page.next_page_token) {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }
        }
    }
}
