//! IAM, org policy and long-running operation models used by lab provisioning.

use serde::{Deserialize, Serialize};

/// Long-running operation returned by `services.enable`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationStatus>,
}

/// `google.rpc.Status` carried by a failed operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OperationStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Org policy (orgpolicy v2).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrgPolicy {
    pub name: String,
    pub spec: PolicySpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PolicySpec {
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_all: Option<bool>,
}

impl OrgPolicy {
    /// Boolean constraint set to enforced or not.
    pub fn boolean(project_id: &str, constraint: &str, enforce: bool) -> Self {
        Self::with_rule(
            project_id,
            constraint,
            PolicyRule { enforce: Some(enforce), allow_all: None },
        )
    }

    /// List constraint that allows every value.
    pub fn allow_all(project_id: &str, constraint: &str) -> Self {
        Self::with_rule(project_id, constraint, PolicyRule { enforce: None, allow_all: Some(true) })
    }

    fn with_rule(project_id: &str, constraint: &str, rule: PolicyRule) -> Self {
        Self {
            name: format!("projects/{project_id}/policies/{constraint}"),
            spec: PolicySpec { rules: vec![rule] },
        }
    }
}

/// Custom IAM role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub included_permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stage: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub role_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceAccountRequest {
    pub account_id: String,
    pub service_account: ServiceAccount,
}

/// Key returned by `serviceAccounts.keys.create`; `private_key_data` is base64.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub private_key_type: String,
    #[serde(default)]
    pub private_key_data: String,
}

/// Project IAM policy. Unknown fields (audit configs) survive a read-modify-write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IamPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub bindings: Vec<Binding>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Binding {
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<serde_json::Value>,
}

impl IamPolicy {
    /// Grant `role` to `member`. Appends to the unconditional binding for the
    /// role when there is one, otherwise adds a binding.
    ///
    /// Returns `false` when the member already held the role.
    pub fn grant(&mut self, role: &str, member: &str) -> bool {
        match self.bindings.iter_mut().find(|b| b.role == role && b.condition.is_none()) {
            Some(binding) if binding.members.iter().any(|m| m == member) => false,
            Some(binding) => {
                binding.members.push(member.to_string());
                true
            },
            None => {
                self.bindings.push(Binding {
                    role: role.to_string(),
                    members: vec![member.to_string()],
                    condition: None,
                });
                true
            },
        }
    }
}
