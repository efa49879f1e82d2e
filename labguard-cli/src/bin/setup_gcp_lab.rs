//! Prepare a Google Cloud project for a lab: APIs, org policies, a runner
//! role and a service account key.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use std::process::ExitCode;

use clap::Parser;
use labguard_cli::cli::SetupArgs;
use labguard_cli::{commands, output, telemetry};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = SetupArgs::parse();
    if let Err(e) = telemetry::init(&args.log_level) {
        eprintln!("{e:#}");
    }
    output::configure_colors();

    match commands::setup(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e:#}");
            ExitCode::FAILURE
        },
    }
}
