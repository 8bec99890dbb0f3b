//! claimdesk - review FHIR claim bundles from the command line

use anyhow::Context;
use clap::Parser;
use claimdesk_cli::{commands, logging, Cli, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first to get logging settings
    let config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _log_guard = logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), command = ?cli.command, "Starting claimdesk");

    let output = commands::run(cli.command, &config).await?;
    println!("{}", output);
    Ok(())
}
