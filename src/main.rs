//! Blueprint Studio
//!
//! Visual backend schema designer with JSON blueprint export.
//!
//! This is the command-line entry point.

use blueprint_cli::Cli;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::from_env();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = blueprint_cli::VERSION, "starting");
    blueprint_cli::run(cli).await
}
