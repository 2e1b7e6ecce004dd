//! LRO CLI
//!
//! Command-line interface for submitting long-running Resource Manager
//! operations and polling them to completion.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lro")]
#[command(about = "Long-running operation poller", long_about = None)]
struct Cli {
    /// Resource Manager endpoint
    #[arg(
        long,
        env = "LRO_ENDPOINT",
        default_value = "https://management.azure.com"
    )]
    endpoint: String,

    /// Bearer token used to authorize requests
    #[arg(long, env = "LRO_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// api-version query parameter appended to resource paths
    #[arg(long, env = "LRO_API_VERSION")]
    api_version: Option<String>,

    /// Overall deadline for polling, in seconds
    #[arg(long, env = "LRO_TIMEOUT", default_value_t = 1800)]
    timeout: u64,

    /// Wait before the first poll, in seconds
    #[arg(long, env = "LRO_INITIAL_DELAY", default_value_t = 5)]
    initial_delay: u64,

    /// Consecutive dropped connections tolerated before giving up
    #[arg(long, env = "LRO_MAX_DROPPED_CONNECTIONS", default_value_t = 3)]
    max_dropped_connections: usize,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lro_cli=info,lro_core=info,lro_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        endpoint: cli.endpoint,
        access_token: cli.access_token,
        api_version: cli.api_version,
        timeout: std::time::Duration::from_secs(cli.timeout),
        initial_delay: std::time::Duration::from_secs(cli.initial_delay),
        max_dropped_connections: cli.max_dropped_connections,
        ..Config::default()
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}
