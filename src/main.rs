#![warn(clippy::all, clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use gptrelay::app::dispatch::dispatch;
use gptrelay::cli::Cli;
use gptrelay::config::Config;
use tracing_subscriber::EnvFilter;

fn init_tracing(cli: &Cli, config: &Config) {
    let directive = if cli.verbose {
        "gptrelay=debug,info".to_string()
    } else {
        config.log_level.clone()
    };
    // RUST_LOG wins over both the flag and the config file.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("configuration error")?;
    init_tracing(&cli, &config);
    dispatch(cli, config).await
}
