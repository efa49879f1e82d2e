//! Domain models shared by the labguard crates.

mod allow_list;
mod iam;
mod quota;
mod scan;
mod setup;
mod token;

pub use allow_list::AllowList;
pub use iam::{
    Binding, CreateRoleRequest, CreateServiceAccountRequest, IamPolicy, Operation,
    OperationStatus, OrgPolicy, PolicyRule, PolicySpec, Role, ServiceAccount, ServiceAccountKey,
};
pub use quota::{
    next_token, ConsumerOverride, Dimensions, MetricsPage, NewOverride, OverridesPage, QuotaBucket,
    QuotaLimit, QuotaMetric, UNKNOWN_LIMIT,
};
pub use scan::{Disposition, ScanEvent, ScanSummary, SkipReason};
pub use setup::{PolicyTarget, SetupEvent};
pub use token::AccessToken;
