//! Lab project bootstrap: APIs, org policies, a runner role, a service
//! account bound to it, and a downloaded key.

mod key_file;
mod operations;

use std::path::PathBuf;
use std::time::Duration;

use labguard_types::models::{
    CreateRoleRequest, CreateServiceAccountRequest, OrgPolicy, PolicyTarget, Role, ServiceAccount,
};
use labguard_types::{validate_segment, ApiError, ConfigError, SetupEvent};

use crate::api::ProvisioningApi;
use crate::error::AppResult;
use crate::report::EventSink;
use crate::utils::logger;

pub use key_file::{decode_key, write_key_file};
pub use operations::{wait_for_operation, PollPolicy};

pub const DEFAULT_KEY_FILE: &str = "credentials.json";

const DEFAULT_APIS: [&str; 4] = [
    "iam.googleapis.com",
    "aiplatform.googleapis.com",
    "cloudresourcemanager.googleapis.com",
    "serviceusage.googleapis.com",
];

const RUNNER_PERMISSIONS: [&str; 5] = [
    "aiplatform.endpoints.get",
    "aiplatform.endpoints.predict",
    "iam.serviceAccounts.get",
    "iam.serviceAccounts.getAccessToken",
    "iam.serviceAccounts.getOpenIdToken",
];

/// One org policy constraint and the state it should end up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyChange {
    pub constraint: String,
    pub target: PolicyTarget,
}

impl PolicyChange {
    fn new(constraint: &str, target: PolicyTarget) -> Self {
        Self { constraint: constraint.to_string(), target }
    }

    fn policy(&self, project_id: &str) -> OrgPolicy {
        match self.target {
            PolicyTarget::Enforce => OrgPolicy::boolean(project_id, &self.constraint, true),
            PolicyTarget::Allow => OrgPolicy::boolean(project_id, &self.constraint, false),
            PolicyTarget::AllowAll => OrgPolicy::allow_all(project_id, &self.constraint),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    pub id: String,
    pub title: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSpec {
    pub id: String,
    pub display_name: String,
}

/// Everything `run_setup` creates for a lab project.
#[derive(Debug, Clone, PartialEq)]
pub struct LabSetupPlan {
    pub project_id: String,
    pub apis: Vec<String>,
    pub policies: Vec<PolicyChange>,
    pub role: RoleSpec,
    pub service_account: AccountSpec,
    /// Wait between account creation and the role binding.
    pub propagation_delay: Duration,
    pub key_file: PathBuf,
    pub poll: PollPolicy,
}

impl LabSetupPlan {
    /// The standard lab setup for `project_id`.
    pub fn new(project_id: impl Into<String>) -> Result<Self, ConfigError> {
        let project_id = project_id.into();
        validate_segment("project_id", &project_id)?;

        Ok(Self {
            project_id,
            apis: DEFAULT_APIS.iter().map(|s| (*s).to_string()).collect(),
            policies: vec![
                PolicyChange::new("iam.disableServiceAccountKeyCreation", PolicyTarget::Allow),
                PolicyChange::new("iam-managed.disableServiceAccountKeyCreation", PolicyTarget::Allow),
                PolicyChange::new(
                    "iam.allowServiceAccountCredentialLifetimeExtension",
                    PolicyTarget::AllowAll,
                ),
            ],
            role: RoleSpec {
                id: "dlai_lab_runner".to_string(),
                title: "DLAI Lab Runner Role".to_string(),
                permissions: RUNNER_PERMISSIONS.iter().map(|s| (*s).to_string()).collect(),
            },
            service_account: AccountSpec {
                id: "dlai-lab-sa".to_string(),
                display_name: "DLAI Lab Service Account".to_string(),
            },
            propagation_delay: Duration::from_secs(5),
            key_file: PathBuf::from(DEFAULT_KEY_FILE),
            poll: PollPolicy::default(),
        })
    }

    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = path.into();
        self
    }

    pub fn service_account_email(&self) -> String {
        format!("{}@{}.iam.gserviceaccount.com", self.service_account.id, self.project_id)
    }

    fn role_name(&self) -> String {
        format!("projects/{}/roles/{}", self.project_id, self.role.id)
    }
}

/// What a completed setup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOutcome {
    pub role_name: String,
    pub service_account_email: String,
    pub key_file: PathBuf,
}

/// Run every provisioning step in order.
///
/// Org policy failures are reported and skipped; any other failure stops
/// the setup.
pub async fn run_setup(
    api: &dyn ProvisioningApi,
    plan: &LabSetupPlan,
    sink: &mut dyn EventSink<SetupEvent>,
) -> AppResult<SetupOutcome> {
    enable_apis(api, plan, sink).await?;

    if let Err(error) = apply_org_policies(api, plan, sink).await {
        logger::log_warn(&format!("Org policy update failed: {error}"));
        sink.emit(SetupEvent::PolicyWarning { error: error.to_string() });
    }

    let role_name = ensure_role(api, plan, sink).await?;
    let email = ensure_service_account(api, plan, sink).await?;

    if !plan.propagation_delay.is_zero() {
        tokio::time::sleep(plan.propagation_delay).await;
    }
    bind_role(api, plan, &role_name, &email, sink).await?;

    sink.emit(SetupEvent::CreatingKey { email: email.clone() });
    let key = api.create_service_account_key(&email).await?;
    let credentials = decode_key(&key)?;
    write_key_file(&plan.key_file, &credentials)?;
    sink.emit(SetupEvent::KeySaved { path: plan.key_file.display().to_string() });

    Ok(SetupOutcome { role_name, service_account_email: email, key_file: plan.key_file.clone() })
}

async fn enable_apis(
    api: &dyn ProvisioningApi,
    plan: &LabSetupPlan,
    sink: &mut dyn EventSink<SetupEvent>,
) -> AppResult<()> {
    sink.emit(SetupEvent::EnablingApis { apis: plan.apis.clone() });
    for service in &plan.apis {
        let operation = api.enable_service(&plan.project_id, service).await?;
        wait_for_operation(api, operation, plan.poll).await?;
        tracing::debug!(service = %service, "Service enabled");
    }
    sink.emit(SetupEvent::ApisEnabled);
    Ok(())
}

/// Stops at the first failing constraint.
async fn apply_org_policies(
    api: &dyn ProvisioningApi,
    plan: &LabSetupPlan,
    sink: &mut dyn EventSink<SetupEvent>,
) -> Result<(), ApiError> {
    for change in &plan.policies {
        sink.emit(SetupEvent::UpdatingPolicy {
            constraint: change.constraint.clone(),
            target: change.target,
        });
        let policy = change.policy(&plan.project_id);
        match api.create_org_policy(&plan.project_id, &policy).await {
            Ok(_) => {},
            Err(e) if e.is_already_exists() => {
                api.update_org_policy(&policy).await?;
            },
            Err(e) => return Err(e),
        }
        sink.emit(SetupEvent::PolicyUpdated { constraint: change.constraint.clone() });
    }
    Ok(())
}

async fn ensure_role(
    api: &dyn ProvisioningApi,
    plan: &LabSetupPlan,
    sink: &mut dyn EventSink<SetupEvent>,
) -> AppResult<String> {
    sink.emit(SetupEvent::CreatingRole { role_id: plan.role.id.clone() });
    let role = Role {
        name: String::new(),
        title: plan.role.title.clone(),
        included_permissions: plan.role.permissions.clone(),
        stage: "GA".to_string(),
    };
    let request = CreateRoleRequest { role_id: plan.role.id.clone(), role: role.clone() };

    let created = match api.create_role(&plan.project_id, &request).await {
        Ok(created) => created,
        Err(e) if e.is_already_exists() => {
            sink.emit(SetupEvent::RoleExists { role_id: plan.role.id.clone() });
            api.update_role(&plan.role_name(), &role).await?
        },
        Err(e) => return Err(e.into()),
    };

    Ok(if created.name.is_empty() { plan.role_name() } else { created.name })
}

async fn ensure_service_account(
    api: &dyn ProvisioningApi,
    plan: &LabSetupPlan,
    sink: &mut dyn EventSink<SetupEvent>,
) -> AppResult<String> {
    let account_id = plan.service_account.id.clone();
    sink.emit(SetupEvent::CreatingServiceAccount { account_id: account_id.clone() });
    let request = CreateServiceAccountRequest {
        account_id: account_id.clone(),
        service_account: ServiceAccount {
            display_name: plan.service_account.display_name.clone(),
            ..Default::default()
        },
    };

    match api.create_service_account(&plan.project_id, &request).await {
        Ok(_) => {},
        Err(e) if e.is_already_exists() => {
            sink.emit(SetupEvent::ServiceAccountExists { account_id });
        },
        Err(e) => return Err(e.into()),
    }
    Ok(plan.service_account_email())
}

async fn bind_role(
    api: &dyn ProvisioningApi,
    plan: &LabSetupPlan,
    role_name: &str,
    email: &str,
    sink: &mut dyn EventSink<SetupEvent>,
) -> AppResult<()> {
    sink.emit(SetupEvent::AssigningRole { role: role_name.to_string(), email: email.to_string() });

    let mut policy = api.get_iam_policy(&plan.project_id).await?;
    if policy.grant(role_name, &format!("serviceAccount:{email}")) {
        api.set_iam_policy(&plan.project_id, &policy).await?;
        sink.emit(SetupEvent::RoleAssigned);
    } else {
        sink.emit(SetupEvent::RoleAlreadyAssigned);
    }
    Ok(())
}
