//! Configuration module
//!
//! Handles CLI configuration: broker location and task deadline. The
//! remaining dispatch timings come from the same environment variables the
//! server reads.

use std::time::Duration;

use anyhow::Result;
use sift_tasks::TaskConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Flower API URL of the broker
    pub broker_url: String,

    /// Overall task deadline in milliseconds
    pub timeout_ms: u64,
}

impl Config {
    /// Dispatcher settings for this invocation
    ///
    /// Starts from [`TaskConfig::from_env`] so `SIFT_POLL_INTERVAL_MS` and
    /// `SIFT_RETRIEVAL_TIMEOUT_MS` apply, then overrides the broker URL and
    /// deadline with the command-line values.
    pub fn task_config(&self) -> Result<TaskConfig> {
        Ok(self.apply(TaskConfig::from_env()?))
    }

    /// The retrieval timeout is capped at the deadline so short deadlines
    /// stay valid.
    fn apply(&self, base: TaskConfig) -> TaskConfig {
        let deadline = Duration::from_millis(self.timeout_ms);
        let retrieval_timeout = base.retrieval_timeout.min(deadline);

        TaskConfig {
            broker_url: self.broker_url.clone(),
            deadline,
            retrieval_timeout,
            ..base
        }
    }
}
