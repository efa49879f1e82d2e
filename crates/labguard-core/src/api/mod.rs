//! REST API seams.
//!
//! The quota scan and the lab setup only talk to these traits; the
//! `reqwest`-backed implementations live next to them and tests substitute
//! in-memory fakes.

mod admin;
mod service_usage;
mod transport;

use async_trait::async_trait;
use labguard_types::models::{
    CreateRoleRequest, CreateServiceAccountRequest, IamPolicy, MetricsPage, NewOverride,
    Operation, OrgPolicy, OverridesPage, Role, ServiceAccount, ServiceAccountKey,
};
use labguard_types::ApiError;

pub use admin::GcpAdminClient;
pub use service_usage::ServiceUsageClient;
pub use transport::GoogleHttp;

/// Consumer quota operations of Service Usage v1beta1.
#[async_trait]
pub trait QuotaApi: Send + Sync {
    /// One page of `consumerQuotaMetrics` under `parent`
    /// (`projects/{project}/services/{service}`).
    async fn list_metrics(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> Result<MetricsPage, ApiError>;

    /// One page of consumer overrides of a limit.
    async fn list_overrides(
        &self,
        limit: &str,
        page_token: Option<&str>,
    ) -> Result<OverridesPage, ApiError>;

    /// Create a consumer override. `force` skips the unsafe-reduction check.
    async fn create_override(
        &self,
        limit: &str,
        body: &NewOverride,
        force: bool,
    ) -> Result<(), ApiError>;
}

/// Project bootstrap operations spread over Service Usage, Org Policy, IAM
/// and Resource Manager.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    async fn enable_service(&self, project_id: &str, service: &str) -> Result<Operation, ApiError>;

    async fn get_operation(&self, name: &str) -> Result<Operation, ApiError>;

    async fn create_org_policy(
        &self,
        project_id: &str,
        policy: &OrgPolicy,
    ) -> Result<OrgPolicy, ApiError>;

    async fn update_org_policy(&self, policy: &OrgPolicy) -> Result<OrgPolicy, ApiError>;

    async fn create_role(
        &self,
        project_id: &str,
        request: &CreateRoleRequest,
    ) -> Result<Role, ApiError>;

    /// `name` is the full role name, `projects/{project}/roles/{id}`.
    async fn update_role(&self, name: &str, role: &Role) -> Result<Role, ApiError>;

    async fn create_service_account(
        &self,
        project_id: &str,
        request: &CreateServiceAccountRequest,
    ) -> Result<ServiceAccount, ApiError>;

    async fn get_iam_policy(&self, project_id: &str) -> Result<IamPolicy, ApiError>;

    async fn set_iam_policy(
        &self,
        project_id: &str,
        policy: &IamPolicy,
    ) -> Result<IamPolicy, ApiError>;

    async fn create_service_account_key(&self, email: &str) -> Result<ServiceAccountKey, ApiError>;
}
