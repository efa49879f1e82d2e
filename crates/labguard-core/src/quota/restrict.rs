//! The restriction scan: walk every metric of a service and force disallowed
//! per-model buckets to zero.

use std::time::Duration;

use futures::{pin_mut, StreamExt};
use labguard_types::models::SkipReason;
use labguard_types::{validate_segment, AllowList, ConfigError, Disposition, ScanEvent, ScanSummary};

use super::decision::decide;
use super::filter::{model_buckets, MODEL_DIMENSION};
use super::inspector::inspect_overrides;
use super::scanner::MetricScanner;
use super::writer::{OverrideWriter, WriteMode, WriteOutcome, DEFAULT_WRITE_DELAY};
use crate::api::QuotaApi;
use crate::report::EventSink;
use crate::utils::logger;

pub const DEFAULT_SERVICE: &str = "aiplatform.googleapis.com";

/// Inputs of one restriction scan.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictConfig {
    pub project_id: String,
    pub service: String,
    pub dimension_key: String,
    pub allow_list: AllowList,
    pub mode: WriteMode,
    pub write_delay: Duration,
}

impl RestrictConfig {
    /// Dry-run config for the Vertex AI service.
    pub fn new(project_id: impl Into<String>, allow_list: AllowList) -> Result<Self, ConfigError> {
        let project_id = project_id.into();
        validate_segment("project_id", &project_id)?;
        if allow_list.is_empty() {
            logger::log_warn("Allow-list is empty; every per-model bucket will be blocked");
        }

        Ok(Self {
            project_id,
            service: DEFAULT_SERVICE.to_string(),
            dimension_key: MODEL_DIMENSION.to_string(),
            allow_list,
            mode: WriteMode::DryRun,
            write_delay: DEFAULT_WRITE_DELAY,
        })
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Result<Self, ConfigError> {
        let service = service.into();
        validate_segment("service", &service)?;
        self.service = service;
        Ok(self)
    }

    pub fn with_dimension_key(mut self, key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::invalid("dimension", "must not be empty"));
        }
        self.dimension_key = key;
        Ok(self)
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    /// `projects/{project}/services/{service}`
    pub fn parent(&self) -> String {
        format!("projects/{}/services/{}", self.project_id, self.service)
    }
}

/// Run one scan pass, reporting every decision to `sink`.
///
/// Never fails: a listing error ends the pass with an `Aborted` event and
/// `summary.aborted` set; writes already issued stay in effect.
pub async fn restrict_models(
    api: &dyn QuotaApi,
    config: &RestrictConfig,
    sink: &mut dyn EventSink<ScanEvent>,
) -> ScanSummary {
    sink.emit(ScanEvent::Started {
        project_id: config.project_id.clone(),
        allow_list: config.allow_list.clone(),
        dry_run: config.mode.is_dry_run(),
    });

    let scanner = MetricScanner::new(api, config.parent());
    let writer = OverrideWriter::new(api, config.mode, config.write_delay);
    let mut summary = ScanSummary::default();

    let metrics = scanner.metrics();
    pin_mut!(metrics);

    while let Some(item) = metrics.next().await {
        let metric = match item {
            Ok(metric) => metric,
            Err(error) => {
                logger::log_error(&format!("Listing {} failed: {error}", scanner.parent()));
                summary.aborted = true;
                sink.emit(ScanEvent::Aborted {
                    error: error.to_string(),
                    permission_denied: error.is_permission_denied(),
                });
                break;
            },
        };
        summary.metrics += 1;
        let label = metric.label();

        for limit in &metric.consumer_quota_limits {
            let lookup = inspect_overrides(api, &limit.name).await;
            if let Some(detail) = lookup.degraded_reason() {
                sink.emit(ScanEvent::OverridesUnknown { limit: limit.name.clone(), detail });
            }

            for bucket in model_buckets(limit, &config.dimension_key) {
                summary.model_buckets += 1;
                let model = bucket.model.to_string();

                let disposition = decide(&bucket, &config.allow_list, &lookup);
                match disposition {
                    Disposition::SkipOverrideExists => sink.emit(ScanEvent::Skipped {
                        model,
                        metric: label.to_string(),
                        reason: SkipReason::OverrideExists,
                    }),
                    Disposition::Allowed => {
                        sink.emit(ScanEvent::Allowed { model, metric: label.to_string() })
                    },
                    Disposition::SkipAlreadyZero => sink.emit(ScanEvent::Skipped {
                        model,
                        metric: label.to_string(),
                        reason: SkipReason::AlreadyZero,
                    }),
                    Disposition::Block => {
                        summary.blocked += 1;
                        sink.emit(ScanEvent::BlockRequired {
                            model,
                            metric: label.to_string(),
                            current_limit: bucket.effective_limit,
                        });
                    },
                }
                if !disposition.requires_write() {
                    continue;
                }

                if writer.is_live() {
                    sink.emit(ScanEvent::Writing { limit_id: limit.short_id().to_string() });
                }
                match writer.zero_out(&limit.name, bucket.dimensions).await {
                    WriteOutcome::DryRun => {},
                    WriteOutcome::Created => {
                        summary.written += 1;
                        sink.emit(ScanEvent::Written);
                    },
                    WriteOutcome::Failed(reason) => {
                        summary.failed += 1;
                        sink.emit(ScanEvent::WriteFailed { reason });
                    },
                }
            }
        }
    }

    tracing::info!(
        metrics = summary.metrics,
        buckets = summary.model_buckets,
        blocked = summary.blocked,
        written = summary.written,
        failed = summary.failed,
        "Scan finished"
    );
    sink.emit(ScanEvent::Finished { summary });
    summary
}

#[cfg(test)]
mod tests {
    use labguard_types::ApiError;

    use super::*;
    use crate::quota::testing::{bucket, dims, existing, limit, metric, FakeQuotaApi};

    const LIMIT_A: &str =
        "projects/lab/services/aiplatform.googleapis.com/consumerQuotaMetrics/gen/limits/per-model";
    const LIMIT_B: &str =
        "projects/lab/services/aiplatform.googleapis.com/consumerQuotaMetrics/online/limits/per-region";

    fn config(allow: &str, mode: WriteMode) -> RestrictConfig {
        RestrictConfig::new("lab", AllowList::parse(allow))
            .map(|c| c.with_mode(mode).with_write_delay(Duration::ZERO))
            .unwrap()
    }

    fn vertex_pages() -> Vec<Vec<labguard_types::QuotaMetric>> {
        vec![
            vec![metric(
                "Generate content requests per minute per project per base model",
                vec![limit(
                    LIMIT_A,
                    vec![
                        bucket(&[("base_model", "gemini-1.0-pro")], 100),
                        bucket(&[("base_model", "gemini-1.5-pro")], 100),
                        bucket(&[("base_model", "text-bison")], 0),
                    ],
                )],
            )],
            vec![metric(
                "Online prediction requests per region",
                vec![limit(
                    LIMIT_B,
                    vec![bucket(&[("region", "us-central1")], 600), bucket(&[], 6000)],
                )],
            )],
        ]
    }

    fn lines(events: &[ScanEvent]) -> Vec<String> {
        events.iter().filter(|e| !e.is_quiet()).map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_blocks_disallowed_model_with_zero_override() {
        let api = FakeQuotaApi::with_pages(vertex_pages());
        let mut events = Vec::new();

        let summary =
            restrict_models(&api, &config("gemini-1.5-pro", WriteMode::Live), &mut events).await;

        let writes = api.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].limit, LIMIT_A);
        assert_eq!(writes[0].body.override_value, "0");
        assert_eq!(writes[0].body.dimensions, dims(&[("base_model", "gemini-1.0-pro")]));
        assert!(writes[0].force);

        assert_eq!(summary.metrics, 2);
        assert_eq!(summary.model_buckets, 3);
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.written, 1);
        assert!(!summary.aborted);

        let out = lines(&events);
        assert!(out.contains(&"   -> Creating override on per-model...".to_string()));
        assert!(out.contains(&"   -> Success.".to_string()));
        assert!(out.iter().any(|l| l.starts_with("[Skipping] text-bison") && l.ends_with("(Limit is already 0)")));
    }

    #[tokio::test]
    async fn test_exact_override_is_never_written() {
        let api = FakeQuotaApi::with_pages(vertex_pages())
            .with_overrides(LIMIT_A, vec![existing(&[("base_model", "gemini-1.0-pro")], 10)]);
        let mut events = Vec::new();

        let summary =
            restrict_models(&api, &config("gemini-1.5-pro", WriteMode::Live), &mut events).await;

        assert!(api.writes().is_empty());
        assert_eq!(summary.blocked, 0);
        assert!(events.contains(&ScanEvent::Skipped {
            model: "gemini-1.0-pro".to_string(),
            metric: "Generate content requests per minute per project per base model".to_string(),
            reason: SkipReason::OverrideExists,
        }));
    }

    #[tokio::test]
    async fn test_override_on_first_page_survives_later_page_outage() {
        let outage = ApiError::Status {
            code: 503,
            status: "UNAVAILABLE".to_string(),
            message: "backend unavailable".to_string(),
        };
        let api = FakeQuotaApi::with_pages(vertex_pages())
            .with_overrides(
                LIMIT_A,
                vec![
                    existing(&[("base_model", "gemini-1.0-pro")], 10),
                    existing(&[("base_model", "text-bison")], 5),
                ],
            )
            .overrides_page_size(1)
            .failing_override_page(1, outage);
        let mut events = Vec::new();

        let summary =
            restrict_models(&api, &config("gemini-1.5-pro", WriteMode::Live), &mut events).await;

        assert!(api.writes().is_empty());
        assert_eq!(summary.blocked, 0);
        assert!(events.contains(&ScanEvent::Skipped {
            model: "gemini-1.0-pro".to_string(),
            metric: "Generate content requests per minute per project per base model".to_string(),
            reason: SkipReason::OverrideExists,
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            ScanEvent::OverridesUnknown { limit, detail } if limit == LIMIT_A && detail.contains("backend unavailable")
        )));
    }

    #[tokio::test]
    async fn test_region_buckets_produce_no_events() {
        let api = FakeQuotaApi::with_pages(vec![vertex_pages().remove(1)]);
        let mut events = Vec::new();

        let summary = restrict_models(&api, &config("", WriteMode::Live), &mut events).await;

        assert_eq!(summary.model_buckets, 0);
        assert!(api.writes().is_empty());
        assert!(events.iter().all(|e| matches!(
            e,
            ScanEvent::Started { .. } | ScanEvent::Finished { .. }
        )));
    }

    #[tokio::test]
    async fn test_overrides_fetched_once_per_limit() {
        let api = FakeQuotaApi::with_pages(vertex_pages());
        let mut events = Vec::new();

        restrict_models(&api, &config("gemini-1.5-pro", WriteMode::DryRun), &mut events).await;

        assert_eq!(api.lookups(), vec![LIMIT_A.to_string(), LIMIT_B.to_string()]);
    }

    #[tokio::test]
    async fn test_dry_run_is_repeatable_and_silent() {
        let api = FakeQuotaApi::with_pages(vertex_pages());
        let cfg = config("gemini-1.5-pro", WriteMode::DryRun);

        let mut first = Vec::new();
        let mut second = Vec::new();
        restrict_models(&api, &cfg, &mut first).await;
        restrict_models(&api, &cfg, &mut second).await;

        assert_eq!(first, second);
        assert!(api.writes().is_empty());
        let out = lines(&first);
        assert!(out.iter().all(|l| !l.contains("Success.") && !l.contains("FAILED")));
        assert!(out.iter().any(|l| l.starts_with("[Action Required] Block gemini-1.0-pro")));
    }

    #[tokio::test]
    async fn test_live_runs_converge_when_overrides_are_listable() {
        let api = FakeQuotaApi::with_pages(vertex_pages()).applying_writes();
        let cfg = config("gemini-1.5-pro", WriteMode::Live);

        restrict_models(&api, &cfg, &mut Vec::new()).await;
        assert_eq!(api.writes().len(), 1);

        let mut second = Vec::new();
        let summary = restrict_models(&api, &cfg, &mut second).await;
        assert_eq!(api.writes().len(), 1);
        assert_eq!(summary.blocked, 0);
        assert!(second.iter().any(|e| matches!(
            e,
            ScanEvent::Skipped { model, reason: SkipReason::OverrideExists, .. } if model == "gemini-1.0-pro"
        )));
    }

    #[tokio::test]
    async fn test_live_runs_converge_when_overrides_are_hidden() {
        let api = FakeQuotaApi::with_pages(vertex_pages())
            .applying_writes()
            .failing_lookups(FakeQuotaApi::permission_denied());
        let cfg = config("gemini-1.5-pro", WriteMode::Live);

        restrict_models(&api, &cfg, &mut Vec::new()).await;
        let mut second = Vec::new();
        restrict_models(&api, &cfg, &mut second).await;

        assert_eq!(api.writes().len(), 1);
        assert!(second.iter().any(|e| matches!(
            e,
            ScanEvent::Skipped { model, reason: SkipReason::AlreadyZero, .. } if model == "gemini-1.0-pro"
        )));
        assert!(second.iter().any(|e| matches!(e, ScanEvent::OverridesUnknown { .. })));
    }

    #[tokio::test]
    async fn test_failed_write_continues_with_next_bucket() {
        let pages = vec![vec![metric(
            "Per model",
            vec![limit(
                LIMIT_A,
                vec![
                    bucket(&[("base_model", "bad-model")], 5),
                    bucket(&[("base_model", "other-model")], 5),
                ],
            )],
        )]];
        let denied = ApiError::Status {
            code: 400,
            status: "FAILED_PRECONDITION".to_string(),
            message: "Override would reduce quota".to_string(),
        };
        let api = FakeQuotaApi::with_pages(pages).failing_writes_for("bad-model", denied);
        let mut events = Vec::new();

        let summary = restrict_models(&api, &config("", WriteMode::Live), &mut events).await;

        assert_eq!(api.writes().len(), 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.written, 1);
        assert!(events.contains(&ScanEvent::WriteFailed {
            reason: "Override would reduce quota".to_string()
        }));
    }

    #[tokio::test]
    async fn test_listing_error_aborts_with_role_hint() {
        let api = FakeQuotaApi::with_pages(vertex_pages())
            .failing_metrics_page(1, FakeQuotaApi::permission_denied());
        let mut events = Vec::new();

        let summary =
            restrict_models(&api, &config("gemini-1.5-pro", WriteMode::Live), &mut events).await;

        assert!(summary.aborted);
        assert_eq!(summary.metrics, 1);
        assert_eq!(api.writes().len(), 1);
        let aborted = events
            .iter()
            .find(|e| matches!(e, ScanEvent::Aborted { .. }))
            .map(ToString::to_string)
            .unwrap();
        assert!(aborted.contains("Quota Administrator"));
    }

    #[test]
    fn test_config_validation() {
        assert!(RestrictConfig::new("", AllowList::default()).is_err());
        assert!(RestrictConfig::new("my lab", AllowList::default()).is_err());

        let cfg = RestrictConfig::new("lab", AllowList::default()).unwrap();
        assert_eq!(cfg.parent(), "projects/lab/services/aiplatform.googleapis.com");
        assert!(cfg.mode.is_dry_run());
        assert_eq!(cfg.write_delay, DEFAULT_WRITE_DELAY);

        assert!(cfg.clone().with_service("a/b").is_err());
        assert!(cfg.clone().with_dimension_key(" ").is_err());
        let custom = cfg.with_service("ml.googleapis.com").unwrap();
        assert_eq!(custom.parent(), "projects/lab/services/ml.googleapis.com");
    }
}
