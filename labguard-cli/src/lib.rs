//! Shared plumbing of the `restrict-vertex-models` and `setup-gcp-lab`
//! binaries.

pub mod cli;
pub mod commands;
pub mod output;
pub mod telemetry;
