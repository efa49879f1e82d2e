//! Progress events of lab provisioning.

use std::fmt;

use serde::{Deserialize, Serialize};

const ORG_POLICY_HINT: &str =
    "Ensure you have 'roles/orgpolicy.policyAdmin' and that the project is in an Organization.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SetupEvent {
    EnablingApis { apis: Vec<String> },
    ApisEnabled,
    UpdatingPolicy { constraint: String, target: PolicyTarget },
    PolicyUpdated { constraint: String },
    PolicyWarning { error: String },
    CreatingRole { role_id: String },
    RoleExists { role_id: String },
    CreatingServiceAccount { account_id: String },
    ServiceAccountExists { account_id: String },
    AssigningRole { role: String, email: String },
    RoleAssigned,
    RoleAlreadyAssigned,
    CreatingKey { email: String },
    KeySaved { path: String },
}

/// Desired state of an org policy constraint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicyTarget {
    Enforce,
    Allow,
    AllowAll,
}

impl fmt::Display for PolicyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enforce => f.write_str("enforce"),
            Self::Allow => f.write_str("allow"),
            Self::AllowAll => f.write_str("allow all"),
        }
    }
}

impl fmt::Display for SetupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnablingApis { apis } => write!(f, "Enabling APIs: {}...", apis.join(", ")),
            Self::ApisEnabled => f.write_str("APIs enabled."),
            Self::UpdatingPolicy { constraint, target } => {
                write!(f, "Updating Org Policy: {constraint} to {target}...")
            },
            Self::PolicyUpdated { constraint } => write!(f, "Updated {constraint}."),
            Self::PolicyWarning { error } => {
                write!(f, "Warning: Could not update Org Policies: {error}\n{ORG_POLICY_HINT}")
            },
            Self::CreatingRole { role_id } => write!(f, "Creating custom role: {role_id}..."),
            Self::RoleExists { role_id } => {
                write!(f, "Role {role_id} already exists, updating...")
            },
            Self::CreatingServiceAccount { account_id } => {
                write!(f, "Creating service account: {account_id}...")
            },
            Self::ServiceAccountExists { account_id } => {
                write!(f, "Service account {account_id} already exists.")
            },
            Self::AssigningRole { role, email } => write!(f, "Assigning role {role} to {email}..."),
            Self::RoleAssigned => f.write_str("Role assigned."),
            Self::RoleAlreadyAssigned => f.write_str("Role already assigned."),
            Self::CreatingKey { email } => write!(f, "Creating key for {email}..."),
            Self::KeySaved { path } => write!(f, "Key saved to {path}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_lines() {
        let event = SetupEvent::UpdatingPolicy {
            constraint: "iam.disableServiceAccountKeyCreation".to_string(),
            target: PolicyTarget::Allow,
        };
        assert_eq!(
            event.to_string(),
            "Updating Org Policy: iam.disableServiceAccountKeyCreation to allow..."
        );

        let warning = SetupEvent::PolicyWarning { error: "HTTP 403".to_string() };
        assert!(warning.to_string().ends_with(ORG_POLICY_HINT));
    }

    #[test]
    fn test_enabling_line() {
        let event = SetupEvent::EnablingApis {
            apis: vec!["iam.googleapis.com".to_string(), "aiplatform.googleapis.com".to_string()],
        };
        assert_eq!(event.to_string(), "Enabling APIs: iam.googleapis.com, aiplatform.googleapis.com...");
    }
}
