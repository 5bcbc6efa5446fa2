//! Task command handlers
//!
//! Runs a single task through the dispatcher and reports its outcome.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use serde_json::Value;
use sift_tasks::{TaskDispatcher, TaskError};

use crate::config::Config;

/// Task subcommands
#[derive(Subcommand)]
pub enum TaskCommands {
    /// Dispatch a task and wait for its result
    Run {
        /// Registered task name (e.g. sift.jobrunner.jobs.lda_nlp.run)
        name: String,

        /// Inline JSON payload
        #[arg(short, long, conflicts_with = "file")]
        payload: Option<String>,

        /// Read the JSON payload from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

pub async fn handle_task_command(command: TaskCommands, config: &Config) -> Result<()> {
    match command {
        TaskCommands::Run {
            name,
            payload,
            file,
        } => {
            let payload = load_payload(payload.as_deref(), file.as_deref())?;
            run_task(config, &name, &payload).await
        }
    }
}

/// Resolves the payload from the inline flag, a file, or `null`
fn load_payload(inline: Option<&str>, file: Option<&Path>) -> Result<Value> {
    match (inline, file) {
        (Some(raw), _) => serde_json::from_str(raw).context("--payload is not valid JSON"),
        (None, Some(path)) => {
            let raw = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_slice(&raw)
                .with_context(|| format!("{} is not valid JSON", path.display()))
        }
        (None, None) => Ok(Value::Null),
    }
}

async fn run_task(config: &Config, name: &str, payload: &Value) -> Result<()> {
    let dispatcher = TaskDispatcher::connect(config.task_config()?)?;

    println!(
        "{} {} {} {}",
        "▸".cyan(),
        "Dispatching".bold(),
        name.cyan(),
        format!("(deadline {} ms)", dispatcher.config().deadline.as_millis()).dimmed()
    );

    let started = Instant::now();
    let result = dispatcher.dispatch(name, payload).await;
    let elapsed = started.elapsed();

    match result {
        Ok(value) => {
            println!(
                "{} {}",
                "✓".green(),
                format!("Completed in {} ms", elapsed.as_millis()).green()
            );
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => {
            let label = classify(&err);
            eprintln!(
                "{} {}",
                "✗".red(),
                format!("Task {} after {} ms", label, elapsed.as_millis()).red()
            );
            Err(anyhow::Error::new(err).context(label))
        }
    }
}

/// Short label for the failure class of a task error
fn classify(err: &TaskError) -> &'static str {
    if err.is_timeout() {
        "timed out"
    } else if err.is_dispatch_error() {
        "dispatch failed"
    } else {
        match err {
            TaskError::PollFailed { .. } => "poll failed",
            TaskError::Retrieval { .. } => "retrieval failed",
            TaskError::Cancelled { .. } => "cancelled",
            _ => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sift_tasks::BrokerError;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_load_inline_payload() {
        let payload = load_payload(Some(r#"{"n": 3}"#), None).unwrap();
        assert_eq!(payload, json!({"n": 3}));
    }

    #[test]
    fn test_load_file_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();

        let payload = load_payload(None, Some(file.path())).unwrap();
        assert_eq!(payload, json!([1, 2, 3]));
    }

    #[test]
    fn test_load_missing_payload_is_null() {
        assert_eq!(load_payload(None, None).unwrap(), Value::Null);
    }

    #[test]
    fn test_load_invalid_payload() {
        assert!(load_payload(Some("{oops"), None).is_err());
    }

    #[test]
    fn test_classify() {
        let timed_out = TaskError::TimedOut {
            task: "t".to_string(),
            deadline: Duration::from_secs(1),
        };
        assert_eq!(classify(&timed_out), "timed out");
        assert_eq!(classify(&TaskError::EmptyTaskName), "dispatch failed");

        let retrieval = TaskError::Retrieval {
            task: "t".to_string(),
            source: BrokerError::Timeout(Duration::from_secs(1)),
        };
        assert_eq!(classify(&retrieval), "retrieval failed");
    }
}
