//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod feedback;
mod task;

pub use feedback::FeedbackCommands;
pub use task::TaskCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run tasks on the broker
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Prepare feedback files
    Feedback {
        #[command(subcommand)]
        command: FeedbackCommands,
    },
}

/// Routes the command to the appropriate handler module
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Task { command } => task::handle_task_command(command, config).await,
        Commands::Feedback { command } => feedback::handle_feedback_command(command),
    }
}
