//! Decisions and progress events of a quota restriction scan.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::AllowList;

/// Characters of a metric label kept in skip lines.
const LABEL_PREVIEW_CHARS: usize = 40;

const PERMISSION_HINT: &str =
    "Ensure you have 'Service Usage Consumer' and 'Quota Administrator' roles.";

/// Outcome of evaluating one model bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// An override with exactly these dimensions exists; manual intent wins.
    SkipOverrideExists,
    /// Model is on the allow-list.
    Allowed,
    /// Not allowed, but the effective limit is already zero.
    SkipAlreadyZero,
    /// Not allowed, no override, nonzero limit: force it to zero.
    Block,
}

impl Disposition {
    pub fn requires_write(self) -> bool {
        matches!(self, Self::Block)
    }
}

/// Why a bucket was skipped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkipReason {
    OverrideExists,
    AlreadyZero,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverrideExists => f.write_str("Manual override exists"),
            Self::AlreadyZero => f.write_str("Limit is already 0"),
        }
    }
}

/// Counters for one scan pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScanSummary {
    pub metrics: usize,
    pub model_buckets: usize,
    pub blocked: usize,
    pub written: usize,
    pub failed: usize,
    /// Listing stopped early on an API error.
    pub aborted: bool,
}

/// One line (or block) of the scan's progress log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    Started { project_id: String, allow_list: AllowList, dry_run: bool },
    Skipped { model: String, metric: String, reason: SkipReason },
    Allowed { model: String, metric: String },
    /// Override lookup degraded to "no known overrides".
    OverridesUnknown { limit: String, detail: String },
    BlockRequired { model: String, metric: String, current_limit: i64 },
    Writing { limit_id: String },
    Written,
    WriteFailed { reason: String },
    Aborted { error: String, permission_denied: bool },
    Finished { summary: ScanSummary },
}

impl ScanEvent {
    /// Events that only go to the debug log, not to stdout.
    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::Allowed { .. } | Self::OverridesUnknown { .. })
    }
}

fn preview(label: &str) -> String {
    label.chars().take(LABEL_PREVIEW_CHARS).collect()
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { project_id, allow_list, dry_run } => {
                writeln!(f, "Scanning quotas for project: {project_id}")?;
                writeln!(f, "Allowed Models: {allow_list}")?;
                writeln!(f, "Dry Run Mode: {dry_run}")
            },
            Self::Skipped { model, metric, reason } => {
                write!(f, "[Skipping] {model} in {}... ({reason})", preview(metric))
            },
            Self::Allowed { model, metric } => {
                write!(f, "[Allowed] {model} in {}...", preview(metric))
            },
            Self::OverridesUnknown { limit, detail } => {
                write!(f, "[Overrides unknown] {limit}: {detail}")
            },
            Self::BlockRequired { model, metric, current_limit } => {
                write!(f, "[Action Required] Block {model} in '{metric}' | Current Limit: {current_limit}")
            },
            Self::Writing { limit_id } => write!(f, "   -> Creating override on {limit_id}..."),
            Self::Written => f.write_str("   -> Success."),
            Self::WriteFailed { reason } => write!(f, "   -> FAILED: {reason}"),
            Self::Aborted { error, permission_denied } => {
                write!(f, "\nAPI Error: {error}")?;
                if *permission_denied {
                    write!(f, "\n{PERMISSION_HINT}")?;
                }
                Ok(())
            },
            Self::Finished { summary } => write!(
                f,
                "Scan complete: {} metrics, {} model buckets, {} blocked, {} written, {} failed",
                summary.metrics, summary.model_buckets, summary.blocked, summary.written, summary.failed
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_line_truncates_label() {
        let event = ScanEvent::Skipped {
            model: "gemini-1.0-pro".to_string(),
            metric: "Generate content requests per minute per project per base model".to_string(),
            reason: SkipReason::OverrideExists,
        };
        assert_eq!(
            event.to_string(),
            "[Skipping] gemini-1.0-pro in Generate content requests per minute per... (Manual override exists)"
        );
    }

    #[test]
    fn test_block_line_keeps_full_label() {
        let event = ScanEvent::BlockRequired {
            model: "gemini-1.0-pro".to_string(),
            metric: "Online prediction requests per base model".to_string(),
            current_limit: 100,
        };
        assert_eq!(
            event.to_string(),
            "[Action Required] Block gemini-1.0-pro in 'Online prediction requests per base model' | Current Limit: 100"
        );
    }

    #[test]
    fn test_abort_hint_only_on_permission_denied() {
        let denied = ScanEvent::Aborted { error: "HTTP 403".to_string(), permission_denied: true };
        let other = ScanEvent::Aborted { error: "HTTP 500".to_string(), permission_denied: false };
        assert!(denied.to_string().ends_with(PERMISSION_HINT));
        assert!(!other.to_string().contains("Quota Administrator"));
    }

    #[test]
    fn test_started_block() {
        let event = ScanEvent::Started {
            project_id: "lab-1".to_string(),
            allow_list: AllowList::parse("gemini-1.5-pro"),
            dry_run: true,
        };
        assert_eq!(
            event.to_string(),
            "Scanning quotas for project: lab-1\nAllowed Models: gemini-1.5-pro\nDry Run Mode: true\n"
        );
    }

    #[test]
    fn test_quiet_events() {
        assert!(ScanEvent::Allowed { model: "m".into(), metric: "x".into() }.is_quiet());
        assert!(!ScanEvent::Written.is_quiet());
        assert!(Disposition::Block.requires_write());
        assert!(!Disposition::SkipAlreadyZero.requires_write());
    }
}
