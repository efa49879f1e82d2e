//! # labguard types
//!
//! Models and error definitions shared by the labguard crates.
//!
//! - **`error`** - Typed errors for API calls, credentials and configuration
//! - **`models`** - Quota, allow-list, IAM and progress-event models
//!
//! ```text
//!        labguard-types (this crate)
//!                │
//!                ▼
//!         labguard-core
//!                │
//!                ▼
//!         labguard-cli
//! ```

pub mod error;
pub mod models;

pub use error::{validate_segment, ApiError, ConfigError, CredentialError};

pub use models::{
    AccessToken, AllowList, ConsumerOverride, Dimensions, Disposition, QuotaBucket, QuotaLimit,
    QuotaMetric, ScanEvent, ScanSummary, SetupEvent,
};
