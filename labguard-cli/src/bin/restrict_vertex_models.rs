//! Force Vertex AI per-model quotas to zero for every model outside an
//! allow-list.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use std::process::ExitCode;

use clap::Parser;
use labguard_cli::cli::RestrictArgs;
use labguard_cli::{commands, output, telemetry};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = RestrictArgs::parse();
    if let Err(e) = telemetry::init(&args.log_level) {
        eprintln!("{e:#}");
    }
    output::configure_colors();

    match commands::restrict(args).await {
        Ok(summary) => {
            if summary.aborted {
                tracing::warn!("Scan stopped early; overrides created so far remain in place");
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            println!("{e:#}");
            ExitCode::FAILURE
        },
    }
}
