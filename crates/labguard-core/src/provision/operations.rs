//! Long-running operation polling.

use std::time::Duration;

use labguard_types::models::Operation;

use crate::api::ProvisioningApi;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_secs(2), max_polls: 60 }
    }
}

/// Wait until `operation` is done. An operation error or running out of
/// polls is an [`AppError::Operation`].
pub async fn wait_for_operation(
    api: &dyn ProvisioningApi,
    operation: Operation,
    policy: PollPolicy,
) -> AppResult<Operation> {
    let mut current = operation;
    let mut polls = 0u32;

    while !current.done {
        // Some enable calls answer with an empty body when nothing changed.
        if current.name.is_empty() {
            return Ok(current);
        }
        if polls >= policy.max_polls {
            return Err(AppError::Operation {
                name: current.name,
                message: format!("not done after {} polls", policy.max_polls),
            });
        }
        tokio::time::sleep(policy.interval).await;
        polls += 1;
        current = api.get_operation(&current.name).await?;
        tracing::debug!(operation = %current.name, polls, done = current.done, "Polled operation");
    }

    match current.error {
        Some(status) => Err(AppError::Operation {
            name: current.name,
            message: format!("code {}: {}", status.code, status.message),
        }),
        None => Ok(current),
    }
}
