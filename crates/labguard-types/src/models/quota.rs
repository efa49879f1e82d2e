//! Service Usage consumer quota models.
//!
//! Field names follow the `serviceusage.googleapis.com/v1beta1` JSON
//! representation. int64 values arrive as JSON strings; both strings and
//! numbers are accepted.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Dimension key → value mapping of a bucket or override.
///
/// Ordered map so that equality ignores the order keys arrived in.
pub type Dimensions = BTreeMap<String, String>;

/// Effective limit reported when a bucket carries no `effectiveLimit`.
pub const UNKNOWN_LIMIT: i64 = -1;

/// A quota metric with its limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuotaMetric {
    /// Resource name, e.g. `projects/123/services/aiplatform.googleapis.com/consumerQuotaMetrics/...`
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// Metric identifier, e.g. `aiplatform.googleapis.com/generate_content_requests_per_minute_per_project_per_base_model`
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub consumer_quota_limits: Vec<QuotaLimit>,
}

impl QuotaMetric {
    /// Human label: display name, falling back to the resource name.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// A limit definition under a metric. Its `name` is the parent of its overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuotaLimit {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub allows_admin_overrides: bool,
    #[serde(default)]
    pub quota_buckets: Vec<QuotaBucket>,
}

impl QuotaLimit {
    /// Last path segment of the limit name, used in progress output.
    pub fn short_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// One dimensioned instance of a limit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuotaBucket {
    #[serde(default, deserialize_with = "int64_opt", skip_serializing_if = "Option::is_none")]
    pub effective_limit: Option<i64>,
    #[serde(default, deserialize_with = "int64_opt", skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<i64>,
    #[serde(default)]
    pub dimensions: Dimensions,
}

impl QuotaBucket {
    /// Effective limit, or [`UNKNOWN_LIMIT`] when the API omitted it.
    pub fn effective_limit_or_unknown(&self) -> i64 {
        self.effective_limit.unwrap_or(UNKNOWN_LIMIT)
    }
}

/// A consumer override on a limit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerOverride {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "int64_opt", skip_serializing_if = "Option::is_none")]
    pub override_value: Option<i64>,
    #[serde(default)]
    pub dimensions: Dimensions,
}

impl ConsumerOverride {
    /// Exact dimension-set match: same keys, same values.
    pub fn matches(&self, dimensions: &Dimensions) -> bool {
        self.dimensions == *dimensions
    }
}

/// Request body for creating a consumer override.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOverride {
    /// int64 as string, as the API expects.
    pub override_value: String,
    pub dimensions: Dimensions,
}

impl NewOverride {
    /// Override forcing the limit to zero for exactly these dimensions.
    pub fn zero(dimensions: Dimensions) -> Self {
        Self { override_value: "0".to_string(), dimensions }
    }
}

/// One page of `consumerQuotaMetrics.list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPage {
    #[serde(default)]
    pub metrics: Vec<QuotaMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// One page of `consumerOverrides.list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OverridesPage {
    #[serde(default)]
    pub overrides: Vec<ConsumerOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Normalize a page token: empty strings end pagination.
pub fn next_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

/// int64 fields arrive as JSON strings or numbers. A malformed value is
/// logged and read as absent so one bad bucket does not fail its page.
fn int64_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Number(i64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<Int64>::deserialize(deserializer)? {
        None => None,
        Some(Int64::Number(n)) => Some(n),
        Some(Int64::Text(s)) => match s.trim().parse::<i64>() {
            Ok(n) => Some(n),
            Err(error) => {
                tracing::warn!(value = %s, %error, "Ignoring malformed int64 quota value");
                None
            },
        },
        Some(Int64::Other(value)) => {
            tracing::warn!(%value, "Ignoring non-integer quota value");
            None
        },
    })
}
