//! In-memory [`QuotaApi`] for unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use labguard_types::models::{MetricsPage, NewOverride, OverridesPage};
use labguard_types::{ApiError, ConsumerOverride, Dimensions, QuotaBucket, QuotaLimit, QuotaMetric};
use parking_lot::Mutex;

use crate::api::QuotaApi;

pub(crate) fn dims(pairs: &[(&str, &str)]) -> Dimensions {
    pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

pub(crate) fn bucket(pairs: &[(&str, &str)], effective_limit: i64) -> QuotaBucket {
    QuotaBucket { effective_limit: Some(effective_limit), default_limit: None, dimensions: dims(pairs) }
}

pub(crate) fn limit(name: &str, buckets: Vec<QuotaBucket>) -> QuotaLimit {
    QuotaLimit { name: name.to_string(), quota_buckets: buckets, ..Default::default() }
}

pub(crate) fn metric(display_name: &str, limits: Vec<QuotaLimit>) -> QuotaMetric {
    QuotaMetric {
        name: format!("projects/p/services/s/consumerQuotaMetrics/{display_name}"),
        display_name: display_name.to_string(),
        consumer_quota_limits: limits,
        ..Default::default()
    }
}

pub(crate) fn existing(pairs: &[(&str, &str)], value: i64) -> ConsumerOverride {
    ConsumerOverride {
        name: "consumerOverrides/manual".to_string(),
        override_value: Some(value),
        dimensions: dims(pairs),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedWrite {
    pub limit: String,
    pub body: NewOverride,
    pub force: bool,
}

/// Pages are addressed by index; the token for page `i` is `i.to_string()`.
#[derive(Default)]
pub(crate) struct FakeQuotaApi {
    pages: Mutex<Vec<Vec<QuotaMetric>>>,
    metrics_failure: Option<(usize, ApiError)>,
    overrides: Mutex<HashMap<String, Vec<ConsumerOverride>>>,
    overrides_page_size: Option<usize>,
    lookup_failure: Option<ApiError>,
    lookup_page_failure: Option<(usize, ApiError)>,
    write_failures: HashMap<String, ApiError>,
    apply_writes: bool,
    metric_requests: Mutex<Vec<Option<String>>>,
    lookups: Mutex<Vec<String>>,
    writes: Mutex<Vec<RecordedWrite>>,
}

impl FakeQuotaApi {
    pub fn with_pages(pages: Vec<Vec<QuotaMetric>>) -> Self {
        Self { pages: Mutex::new(pages), ..Default::default() }
    }

    pub fn permission_denied() -> ApiError {
        ApiError::Status {
            code: 403,
            status: "PERMISSION_DENIED".to_string(),
            message: "Permission denied on resource project p.".to_string(),
        }
    }

    pub fn failing_metrics_page(mut self, page: usize, error: ApiError) -> Self {
        self.metrics_failure = Some((page, error));
        self
    }

    pub fn with_overrides(self, limit: &str, overrides: Vec<ConsumerOverride>) -> Self {
        self.overrides.lock().insert(limit.to_string(), overrides);
        self
    }

    pub fn overrides_page_size(mut self, size: usize) -> Self {
        self.overrides_page_size = Some(size);
        self
    }

    /// Every override lookup fails with `error`.
    pub fn failing_lookups(mut self, error: ApiError) -> Self {
        self.lookup_failure = Some(error);
        self
    }

    /// Override pages starting at `offset` fail with `error`; earlier pages
    /// are served normally.
    pub fn failing_override_page(mut self, offset: usize, error: ApiError) -> Self {
        self.lookup_page_failure = Some((offset, error));
        self
    }

    /// Writes targeting `model` (the `base_model` dimension) fail with `error`.
    pub fn failing_writes_for(mut self, model: &str, error: ApiError) -> Self {
        self.write_failures.insert(model.to_string(), error);
        self
    }

    /// Successful writes zero the matching bucket and record the override,
    /// as the live service would.
    pub fn applying_writes(mut self) -> Self {
        self.apply_writes = true;
        self
    }

    pub fn metric_page_requests(&self) -> Vec<Option<String>> {
        self.metric_requests.lock().clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().clone()
    }
}

#[async_trait]
impl QuotaApi for FakeQuotaApi {
    async fn list_metrics(
        &self,
        _parent: &str,
        page_token: Option<&str>,
    ) -> Result<MetricsPage, ApiError> {
        self.metric_requests.lock().push(page_token.map(str::to_string));
        let index: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);

        if let Some((failing, error)) = &self.metrics_failure {
            if *failing == index {
                return Err(error.clone());
            }
        }

        let pages = self.pages.lock();
        let metrics = pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());
        Ok(MetricsPage { metrics, next_page_token })
    }

    async fn list_overrides(
        &self,
        limit: &str,
        page_token: Option<&str>,
    ) -> Result<OverridesPage, ApiError> {
        self.lookups.lock().push(limit.to_string());
        if let Some(error) = &self.lookup_failure {
            return Err(error.clone());
        }

        let all = self.overrides.lock().get(limit).cloned().unwrap_or_default();
        let offset: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        if let Some((failing, error)) = &self.lookup_page_failure {
            if *failing == offset {
                return Err(error.clone());
            }
        }
        let size = self.overrides_page_size.unwrap_or(usize::MAX);
        let end = offset.saturating_add(size).min(all.len());
        let overrides = all.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_page_token = (end < all.len()).then(|| end.to_string());
        Ok(OverridesPage { overrides, next_page_token })
    }

    async fn create_override(
        &self,
        limit: &str,
        body: &NewOverride,
        force: bool,
    ) -> Result<(), ApiError> {
        self.writes.lock().push(RecordedWrite {
            limit: limit.to_string(),
            body: body.clone(),
            force,
        });

        if let Some(model) = body.dimensions.get("base_model") {
            if let Some(error) = self.write_failures.get(model) {
                return Err(error.clone());
            }
        }

        if self.apply_writes {
            let mut pages = self.pages.lock();
            for bucket in pages
                .iter_mut()
                .flatten()
                .flat_map(|m| m.consumer_quota_limits.iter_mut())
                .filter(|l| l.name == limit)
                .flat_map(|l| l.quota_buckets.iter_mut())
                .filter(|b| b.dimensions == body.dimensions)
            {
                bucket.effective_limit = Some(0);
            }
            self.overrides.lock().entry(limit.to_string()).or_default().push(ConsumerOverride {
                name: format!("{limit}/consumerOverrides/generated"),
                override_value: Some(0),
                dimensions: body.dimensions.clone(),
            });
        }
        Ok(())
    }
}
