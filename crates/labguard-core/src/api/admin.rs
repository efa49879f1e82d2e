//! Provisioning client over Service Usage v1, Org Policy v2, IAM v1 and
//! Resource Manager v3.

use async_trait::async_trait;
use labguard_types::models::{
    CreateRoleRequest, CreateServiceAccountRequest, IamPolicy, Operation, OrgPolicy, Role,
    ServiceAccount, ServiceAccountKey,
};
use labguard_types::ApiError;
use serde_json::json;

use super::{GoogleHttp, ProvisioningApi};
use crate::config::ApiEndpoints;

/// Policy version that keeps conditional bindings intact on write-back.
const IAM_POLICY_VERSION: i32 = 3;

/// [`ProvisioningApi`] over the public Google Cloud REST endpoints.
#[derive(Clone)]
pub struct GcpAdminClient {
    transport: GoogleHttp,
    endpoints: ApiEndpoints,
}

impl GcpAdminClient {
    pub fn new(transport: GoogleHttp, endpoints: ApiEndpoints) -> Self {
        Self { transport, endpoints }
    }
}

#[async_trait]
impl ProvisioningApi for GcpAdminClient {
    async fn enable_service(&self, project_id: &str, service: &str) -> Result<Operation, ApiError> {
        let url = format!(
            "{}/v1/projects/{}/services/{}:enable",
            self.endpoints.service_usage, project_id, service
        );
        self.transport.post(&url, &[], &json!({})).await
    }

    async fn get_operation(&self, name: &str) -> Result<Operation, ApiError> {
        let url = format!("{}/v1/{}", self.endpoints.service_usage, name);
        self.transport.get(&url, &[]).await
    }

    async fn create_org_policy(
        &self,
        project_id: &str,
        policy: &OrgPolicy,
    ) -> Result<OrgPolicy, ApiError> {
        let url = format!("{}/v2/projects/{}/policies", self.endpoints.org_policy, project_id);
        self.transport.post(&url, &[], policy).await
    }

    async fn update_org_policy(&self, policy: &OrgPolicy) -> Result<OrgPolicy, ApiError> {
        let url = format!("{}/v2/{}", self.endpoints.org_policy, policy.name);
        self.transport.patch(&url, &[], policy).await
    }

    async fn create_role(
        &self,
        project_id: &str,
        request: &CreateRoleRequest,
    ) -> Result<Role, ApiError> {
        let url = format!("{}/v1/projects/{}/roles", self.endpoints.iam, project_id);
        self.transport.post(&url, &[], request).await
    }

    async fn update_role(&self, name: &str, role: &Role) -> Result<Role, ApiError> {
        let url = format!("{}/v1/{}", self.endpoints.iam, name);
        self.transport
            .patch(&url, &[("updateMask", "title,includedPermissions,stage")], role)
            .await
    }

    async fn create_service_account(
        &self,
        project_id: &str,
        request: &CreateServiceAccountRequest,
    ) -> Result<ServiceAccount, ApiError> {
        let url = format!("{}/v1/projects/{}/serviceAccounts", self.endpoints.iam, project_id);
        self.transport.post(&url, &[], request).await
    }

    async fn get_iam_policy(&self, project_id: &str) -> Result<IamPolicy, ApiError> {
        let url =
            format!("{}/v3/projects/{}:getIamPolicy", self.endpoints.resource_manager, project_id);
        let body = json!({ "options": { "requestedPolicyVersion": IAM_POLICY_VERSION } });
        self.transport.post(&url, &[], &body).await
    }

    async fn set_iam_policy(
        &self,
        project_id: &str,
        policy: &IamPolicy,
    ) -> Result<IamPolicy, ApiError> {
        let url =
            format!("{}/v3/projects/{}:setIamPolicy", self.endpoints.resource_manager, project_id);
        let mut policy = policy.clone();
        policy.version = Some(policy.version.unwrap_or(IAM_POLICY_VERSION).max(IAM_POLICY_VERSION));
        self.transport.post(&url, &[], &json!({ "policy": policy })).await
    }

    async fn create_service_account_key(&self, email: &str) -> Result<ServiceAccountKey, ApiError> {
        let url = format!("{}/v1/projects/-/serviceAccounts/{}/keys", self.endpoints.iam, email);
        let body = json!({ "privateKeyType": "TYPE_GOOGLE_CREDENTIALS_FILE" });
        self.transport.post(&url, &[], &body).await
    }
}
