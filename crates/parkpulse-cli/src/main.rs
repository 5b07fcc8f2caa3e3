mod cli;
mod commands;
mod error;
mod output;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use parkpulse_core::{CoreConfig, ParkDataService, ReqwestHttpClient, RetryConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = layered_config(cli)?;
    tracing::debug!(?config, "configuration loaded");

    let service = ParkDataService::new(config, Arc::new(ReqwestHttpClient::new()));
    let payload = commands::run(cli, &service).await?;
    output::render(&payload, cli.pretty)
}

/// Environment configuration with command-line overrides on top.
fn layered_config(cli: &Cli) -> Result<CoreConfig, CliError> {
    let mut config = CoreConfig::from_env()?;

    config.retry = layered_retry(cli, &config.retry);
    Ok(config)
}

fn layered_retry(cli: &Cli, base: &RetryConfig) -> RetryConfig {
    let strategy = cli.backoff.unwrap_or_else(|| base.backoff.strategy());
    let delay = cli
        .retry_delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| base.backoff.base_delay());
    let retries = cli.retries.unwrap_or(base.max_retries);
    RetryConfig::with_strategy(strategy, delay, retries)
}

/// Logs go to stderr; stdout carries only JSON.
fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "parkpulse=info",
        1 => "parkpulse=debug",
        _ => "parkpulse=trace",
    };
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if verbose == 0 => EnvFilter::new(directives),
        _ => EnvFilter::new(default_directive),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
