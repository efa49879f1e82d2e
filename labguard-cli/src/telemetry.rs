use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. Logs go to stderr so stdout carries only the
/// progress lines.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("setting default subscriber failed: {e}"))
}
