//! Sift CLI
//!
//! Command-line interface for running broker tasks and preparing feedback
//! files.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Sift feedback and task CLI", long_about = None)]
struct Cli {
    /// Flower API URL of the task broker
    #[arg(long, env = "SIFT_BROKER_URL", default_value = "http://localhost:5555")]
    broker_url: String,

    /// Overall deadline for a task, in milliseconds
    #[arg(long, env = "SIFT_TASK_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sift_tasks=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config {
        broker_url: cli.broker_url,
        timeout_ms: cli.timeout_ms,
    };

    handle_command(cli.command, &config).await
}
