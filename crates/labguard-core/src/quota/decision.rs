//! Allow/skip/block decision for one model bucket.

use labguard_types::{AllowList, Disposition};

use super::filter::ModelBucket;
use super::inspector::OverrideLookup;

/// Decide what to do with a bucket.
///
/// Order matters: an exact known override wins over everything, then
/// allow-list membership, then the already-zero check.
pub fn decide(
    bucket: &ModelBucket<'_>,
    allow_list: &AllowList,
    lookup: &OverrideLookup,
) -> Disposition {
    if lookup.has_exact(bucket.dimensions) {
        Disposition::SkipOverrideExists
    } else if allow_list.contains(bucket.model) {
        Disposition::Allowed
    } else if bucket.effective_limit == 0 {
        Disposition::SkipAlreadyZero
    } else {
        Disposition::Block
    }
}
