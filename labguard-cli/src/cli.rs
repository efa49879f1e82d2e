use std::path::PathBuf;

use clap::Parser;
use labguard_core::provision::DEFAULT_KEY_FILE;
use labguard_core::quota::{DEFAULT_SERVICE, MODEL_DIMENSION};

#[derive(Parser, Debug)]
#[command(
    name = "restrict-vertex-models",
    about = "Set Vertex AI quotas to 0 for disallowed models.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct RestrictArgs {
    #[arg(help = "The Google Cloud Project ID")]
    pub project_id: String,

    #[arg(
        short,
        long,
        required = true,
        help = "Comma-separated list of allowed base_models (e.g., gemini-1.5-pro)"
    )]
    pub allow: String,

    #[arg(long, help = "Actually create overrides. Without it the scan only reports.")]
    pub no_dry_run: bool,

    #[arg(long, default_value = DEFAULT_SERVICE, help = "Service whose quotas are scanned")]
    pub service: String,

    #[arg(long, default_value = MODEL_DIMENSION, help = "Dimension key that names the model")]
    pub dimension: String,

    #[arg(long, default_value_t = 500, help = "Pause after each override write, in milliseconds")]
    pub write_delay_ms: u64,

    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Send every API call to this base URL (emulators, proxies).
    #[arg(long, env = "LABGUARD_API_ENDPOINT", hide = true)]
    pub api_endpoint: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "setup-gcp-lab",
    about = "Setup GCP Project for DLAI Lab",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct SetupArgs {
    #[arg(long = "project-id", alias = "project_id", help = "Google Cloud Project ID")]
    pub project_id: String,

    #[arg(long, default_value = DEFAULT_KEY_FILE, help = "Where to write the service account key")]
    pub key_file: PathBuf,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Send every API call to this base URL (emulators, proxies).
    #[arg(long, env = "LABGUARD_API_ENDPOINT", hide = true)]
    pub api_endpoint: Option<String>,
}
