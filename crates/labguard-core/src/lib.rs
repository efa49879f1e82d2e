//! # labguard core
//!
//! Credential bootstrap, Google Cloud REST clients, the Vertex AI model
//! restriction scan and lab project provisioning.
//!
//! ```text
//! labguard-core/src/
//! ├── auth/       # CredentialConfig, token exchange, cached tokens
//! ├── api/        # QuotaApi / ProvisioningApi traits + reqwest clients
//! ├── quota/      # scanner, inspector, filter, decision, writer, scan
//! ├── provision/  # lab setup workflow
//! ├── report.rs   # event sinks
//! └── utils/      # HTTP client builder, logging wrappers
//! ```

#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::assertions_on_result_states)
)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod provision;
pub mod quota;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use api::{GcpAdminClient, GoogleHttp, ProvisioningApi, QuotaApi, ServiceUsageClient};
pub use auth::{CredentialConfig, CredentialSource, Credentials};
pub use config::ApiEndpoints;
pub use error::{AppError, AppResult};
pub use provision::{run_setup, LabSetupPlan, SetupOutcome};
pub use quota::{restrict_models, RestrictConfig, WriteMode};
pub use report::{EventSink, Reportable};
