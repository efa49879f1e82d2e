//! Existing consumer overrides of a limit.

use labguard_types::models::next_token;
use labguard_types::{ApiError, ConsumerOverride, Dimensions};

use crate::api::QuotaApi;

/// Result of looking up the overrides of one limit.
///
/// `Found` and `Partial` carry data; the other outcomes are treated as "no
/// known overrides" so the scan can continue.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideLookup {
    Found(Vec<ConsumerOverride>),
    /// A later page failed; `found` holds every override read before it.
    Partial { found: Vec<ConsumerOverride>, reason: String },
    /// The limit does not accept consumer overrides.
    Unsupported(String),
    PermissionDenied(String),
    /// Any other failure (5xx, transport, undecodable body).
    Unavailable(String),
}

impl OverrideLookup {
    pub fn from_error(error: &ApiError) -> Self {
        if error.is_permission_denied() {
            Self::PermissionDenied(error.reason())
        } else if error.is_unsupported() {
            Self::Unsupported(error.reason())
        } else {
            Self::Unavailable(error.to_string())
        }
    }

    /// Known overrides; empty when the lookup degraded.
    pub fn overrides(&self) -> &[ConsumerOverride] {
        match self {
            Self::Found(overrides) | Self::Partial { found: overrides, .. } => overrides,
            _ => &[],
        }
    }

    /// Why the lookup degraded, if it did.
    pub fn degraded_reason(&self) -> Option<String> {
        match self {
            Self::Found(_) => None,
            Self::Partial { found, reason } => {
                Some(format!("only {} override(s) known: {reason}", found.len()))
            },
            Self::Unsupported(reason) => Some(format!("overrides unsupported: {reason}")),
            Self::PermissionDenied(reason) => Some(format!("permission denied: {reason}")),
            Self::Unavailable(reason) => Some(format!("lookup failed: {reason}")),
        }
    }

    /// An override with exactly `dimensions` is known.
    pub fn has_exact(&self, dimensions: &Dimensions) -> bool {
        self.overrides().iter().any(|o| o.matches(dimensions))
    }
}

/// Fetch every override page of `limit`. Never fails: errors become a
/// degraded [`OverrideLookup`].
pub async fn inspect_overrides(api: &dyn QuotaApi, limit: &str) -> OverrideLookup {
    let mut found = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        match api.list_overrides(limit, page_token.as_deref()).await {
            Ok(page) => {
                found.extend(page.overrides);
                match next_token(page.next_page_token) {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            },
            Err(error) if !found.is_empty() => {
                tracing::warn!(
                    limit,
                    %error,
                    known = found.len(),
                    "Override lookup failed mid-way; keeping pages already read"
                );
                return OverrideLookup::Partial { found, reason: error.reason() };
            },
            Err(error) => {
                let lookup = OverrideLookup::from_error(&error);
                match lookup {
                    OverrideLookup::Unsupported(_) => {
                        tracing::debug!(limit, %error, "Limit does not support overrides");
                    },
                    _ => tracing::warn!(limit, %error, "Override lookup failed; assuming none"),
                }
                return lookup;
            },
        }
    }

    tracing::debug!(limit, overrides = found.len(), "Fetched existing overrides");
    OverrideLookup::Found(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::testing::{dims, existing, FakeQuotaApi};

    const LIMIT: &str = "projects/p/services/s/consumerQuotaMetrics/m/limits/l";

    #[tokio::test]
    async fn test_collects_all_pages() {
        let api = FakeQuotaApi::default()
            .with_overrides(
                LIMIT,
                vec![
                    existing(&[("base_model", "a")], 1),
                    existing(&[("base_model", "b")], 2),
                    existing(&[("base_model", "c")], 3),
                ],
            )
            .overrides_page_size(2);

        let lookup = inspect_overrides(&api, LIMIT).await;
        assert_eq!(lookup.overrides().len(), 3);
        assert!(lookup.has_exact(&dims(&[("base_model", "c")])));
        assert_eq!(api.lookups().len(), 2);
        assert_eq!(lookup.degraded_reason(), None);
    }

    #[tokio::test]
    async fn test_permission_denied_degrades_to_empty() {
        let api = FakeQuotaApi::default()
            .with_overrides(LIMIT, vec![existing(&[("base_model", "a")], 1)])
            .failing_lookups(FakeQuotaApi::permission_denied());

        let lookup = inspect_overrides(&api, LIMIT).await;
        assert!(matches!(lookup, OverrideLookup::PermissionDenied(_)));
        assert!(lookup.overrides().is_empty());
        assert!(!lookup.has_exact(&dims(&[("base_model", "a")])));
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_earlier_pages() {
        let outage = ApiError::Status {
            code: 503,
            status: "UNAVAILABLE".to_string(),
            message: "backend unavailable".to_string(),
        };
        let api = FakeQuotaApi::default()
            .with_overrides(
                LIMIT,
                vec![existing(&[("base_model", "a")], 1), existing(&[("base_model", "b")], 2)],
            )
            .overrides_page_size(1)
            .failing_override_page(1, outage);

        let lookup = inspect_overrides(&api, LIMIT).await;
        assert!(matches!(lookup, OverrideLookup::Partial { .. }));
        assert!(lookup.has_exact(&dims(&[("base_model", "a")])));
        assert!(!lookup.has_exact(&dims(&[("base_model", "b")])));
        assert!(lookup.degraded_reason().is_some_and(|r| r.contains("backend unavailable")));
    }

    #[tokio::test]
    async fn test_first_page_failure_is_classified() {
        let api = FakeQuotaApi::default()
            .with_overrides(LIMIT, vec![existing(&[("base_model", "a")], 1)])
            .failing_override_page(0, FakeQuotaApi::permission_denied());

        let lookup = inspect_overrides(&api, LIMIT).await;
        assert!(matches!(lookup, OverrideLookup::PermissionDenied(_)));
    }

    #[test]
    fn test_error_classification() {
        let unsupported = ApiError::Status {
            code: 400,
            status: "FAILED_PRECONDITION".to_string(),
            message: "Overrides are not allowed for this limit".to_string(),
        };
        assert_eq!(
            OverrideLookup::from_error(&unsupported),
            OverrideLookup::Unsupported("Overrides are not allowed for this limit".to_string())
        );

        let outage = ApiError::Status {
            code: 503,
            status: "UNAVAILABLE".to_string(),
            message: "try later".to_string(),
        };
        assert!(matches!(OverrideLookup::from_error(&outage), OverrideLookup::Unavailable(_)));

        let transport = ApiError::Transport { message: "reset".to_string() };
        let lookup = OverrideLookup::from_error(&transport);
        assert!(lookup.degraded_reason().is_some_and(|r| r.contains("reset")));
    }
}
