//! Zero-value override creation, gated by dry-run.

use std::time::Duration;

use labguard_types::models::NewOverride;
use labguard_types::Dimensions;

use crate::api::QuotaApi;
use crate::utils::logger;

/// Pause after each write to stay clear of the Service Usage write quota.
pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Report decisions only.
    #[default]
    DryRun,
    /// Create overrides.
    Live,
}

impl WriteMode {
    pub fn from_no_dry_run(no_dry_run: bool) -> Self {
        if no_dry_run {
            Self::Live
        } else {
            Self::DryRun
        }
    }

    pub fn is_dry_run(self) -> bool {
        self == Self::DryRun
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Nothing sent.
    DryRun,
    Created,
    /// Provider reason string.
    Failed(String),
}

/// Forces limits to zero. Failures are returned, never propagated: the
/// scan keeps going and nothing is retried.
pub struct OverrideWriter<'a> {
    api: &'a dyn QuotaApi,
    mode: WriteMode,
    delay: Duration,
}

impl<'a> OverrideWriter<'a> {
    pub fn new(api: &'a dyn QuotaApi, mode: WriteMode, delay: Duration) -> Self {
        Self { api, mode, delay }
    }

    pub fn is_live(&self) -> bool {
        self.mode == WriteMode::Live
    }

    /// Create a `0` override for exactly `dimensions` under `limit`, with
    /// `force` set since this is a deliberate drastic reduction.
    pub async fn zero_out(&self, limit: &str, dimensions: &Dimensions) -> WriteOutcome {
        if !self.is_live() {
            return WriteOutcome::DryRun;
        }

        let body = NewOverride::zero(dimensions.clone());
        let outcome = match self.api.create_override(limit, &body, true).await {
            Ok(()) => {
                logger::log_info(&format!("Created zero override on {limit} for {dimensions:?}"));
                WriteOutcome::Created
            },
            Err(error) => {
                logger::log_warn(&format!("Override creation on {limit} failed: {error}"));
                WriteOutcome::Failed(error.reason())
            },
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        outcome
    }
}
