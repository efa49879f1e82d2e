//! Service Usage quota restriction.
//!
//! ```text
//! quota/
//! ├── scanner.rs    # paginated metric stream
//! ├── inspector.rs  # existing overrides per limit
//! ├── filter.rs     # per-model buckets
//! ├── decision.rs   # skip / allow / block
//! ├── writer.rs     # zero overrides, dry-run gated
//! └── restrict.rs   # the scan itself
//! ```

mod decision;
mod filter;
mod inspector;
mod restrict;
mod scanner;
mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use decision::decide;
pub use filter::{model_buckets, model_of, ModelBucket, MODEL_DIMENSION};
pub use inspector::{inspect_overrides, OverrideLookup};
pub use restrict::{restrict_models, RestrictConfig, DEFAULT_SERVICE};
pub use scanner::MetricScanner;
pub use writer::{OverrideWriter, WriteMode, WriteOutcome, DEFAULT_WRITE_DELAY};
