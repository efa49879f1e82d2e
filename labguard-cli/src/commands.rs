use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use labguard_core::provision::run_setup;
use labguard_core::quota::{restrict_models, RestrictConfig, WriteMode};
use labguard_core::utils::http::{create_client, DEFAULT_TIMEOUT_SECS};
use labguard_core::{
    ApiEndpoints, CredentialConfig, Credentials, GcpAdminClient, GoogleHttp, LabSetupPlan,
    ServiceUsageClient,
};
use labguard_types::{AllowList, ScanSummary};

use crate::cli::{RestrictArgs, SetupArgs};
use crate::output::ConsoleSink;

fn endpoints(api_endpoint: Option<&str>) -> ApiEndpoints {
    api_endpoint.map(ApiEndpoints::single).unwrap_or_default()
}

/// Resolve credentials from the environment and wrap them in a transport.
async fn connect() -> Result<GoogleHttp> {
    let http = create_client(DEFAULT_TIMEOUT_SECS).context("Error initializing credentials")?;
    let config = CredentialConfig::from_env();
    tracing::info!("Using {}", config.describe());

    let credentials = Credentials::bootstrap(&config, http.clone())
        .await
        .context("Error initializing credentials")?;
    Ok(GoogleHttp::new(http, Arc::new(credentials)))
}

/// Scan the project and report to stdout. Per-bucket failures and scan
/// aborts are part of the report, not errors.
pub async fn restrict(args: RestrictArgs) -> Result<ScanSummary> {
    let config = RestrictConfig::new(args.project_id, AllowList::parse(&args.allow))?
        .with_service(args.service)?
        .with_dimension_key(args.dimension)?
        .with_mode(WriteMode::from_no_dry_run(args.no_dry_run))
        .with_write_delay(Duration::from_millis(args.write_delay_ms));

    let transport = connect().await?;
    let api = ServiceUsageClient::new(
        transport,
        endpoints(args.api_endpoint.as_deref()).service_usage,
    );

    Ok(restrict_models(&api, &config, &mut ConsoleSink::stdout()).await)
}

pub async fn setup(args: SetupArgs) -> Result<()> {
    let plan = LabSetupPlan::new(args.project_id)?.with_key_file(args.key_file);

    let transport = connect().await?;
    let api = GcpAdminClient::new(transport, endpoints(args.api_endpoint.as_deref()));

    let outcome = run_setup(&api, &plan, &mut ConsoleSink::stdout()).await?;
    tracing::info!(
        role = %outcome.role_name,
        service_account = %outcome.service_account_email,
        "Lab setup complete"
    );
    Ok(())
}
