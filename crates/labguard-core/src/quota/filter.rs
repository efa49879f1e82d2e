//! Selects the per-model buckets of a limit.

use labguard_types::{Dimensions, QuotaLimit};

/// Dimension key Vertex AI uses for per-model buckets.
pub const MODEL_DIMENSION: &str = "base_model";

/// A bucket that is keyed by a model identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBucket<'a> {
    pub model: &'a str,
    pub dimensions: &'a Dimensions,
    pub effective_limit: i64,
}

/// Model identifier of a dimension set, if it carries `key`.
pub fn model_of<'a>(dimensions: &'a Dimensions, key: &str) -> Option<&'a str> {
    dimensions.get(key).map(String::as_str)
}

/// Buckets of `limit` that carry `key`; region-only and aggregate buckets
/// are skipped.
pub fn model_buckets<'a>(
    limit: &'a QuotaLimit,
    key: &'a str,
) -> impl Iterator<Item = ModelBucket<'a>> + 'a {
    limit.quota_buckets.iter().filter_map(move |bucket| {
        model_of(&bucket.dimensions, key).map(|model| ModelBucket {
            model,
            dimensions: &bucket.dimensions,
            effective_limit: bucket.effective_limit_or_unknown(),
        })
    })
}
