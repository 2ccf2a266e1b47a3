use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use swapquote::application::{Cli, CommandExecutor};
use swapquote::shared::config::QuoterConfig;

const DEFAULT_CONFIG_PATH: &str = "Config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    // Explicit --config must exist; the default file is optional
    let config = match &cli.config {
        Some(path) => QuoterConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => QuoterConfig::from_file(DEFAULT_CONFIG_PATH)?,
        None => QuoterConfig::default(),
    };
    info!(
        "⚙️ Router: max hops {}, {} bridge tokens",
        config.router.max_hops,
        config.router.bridge_tokens.len()
    );

    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
