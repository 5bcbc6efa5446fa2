//! Dispatch configuration
//!
//! Timing contracts for dispatched jobs and the broker location.

use std::time::Duration;

/// Default cadence of readiness checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default overall deadline from submission to giving up
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Default budget for fetching a value once the job is ready
pub const DEFAULT_RETRIEVAL_TIMEOUT: Duration = Duration::from_secs(1);

/// Default Flower API location
pub const DEFAULT_BROKER_URL: &str = "http://localhost:5555";

/// Task dispatch configuration
#[derive(Debug, Clone)]
pub struct TaskConfig {
    /// Base URL of the broker API (e.g., "http://localhost:5555")
    pub broker_url: String,

    /// Fixed delay between readiness checks
    pub poll_interval: Duration,

    /// Maximum time from obtaining a handle to giving up on the job
    pub deadline: Duration,

    /// Maximum time to fetch a value once the job reports ready
    pub retrieval_timeout: Duration,
}

impl TaskConfig {
    /// Creates a configuration with default timings
    pub fn new(broker_url: impl Into<String>) -> Self {
        Self {
            broker_url: broker_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: DEFAULT_DEADLINE,
            retrieval_timeout: DEFAULT_RETRIEVAL_TIMEOUT,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SIFT_BROKER_URL (optional, default: http://localhost:5555)
    /// - SIFT_POLL_INTERVAL_MS (optional, default: 50)
    /// - SIFT_TASK_TIMEOUT_MS (optional, default: 10000)
    /// - SIFT_RETRIEVAL_TIMEOUT_MS (optional, default: 1000)
    pub fn from_env() -> anyhow::Result<Self> {
        let broker_url =
            std::env::var("SIFT_BROKER_URL").unwrap_or_else(|_| DEFAULT_BROKER_URL.to_string());

        let config = Self {
            broker_url,
            poll_interval: env_millis("SIFT_POLL_INTERVAL_MS")?.unwrap_or(DEFAULT_POLL_INTERVAL),
            deadline: env_millis("SIFT_TASK_TIMEOUT_MS")?.unwrap_or(DEFAULT_DEADLINE),
            retrieval_timeout: env_millis("SIFT_RETRIEVAL_TIMEOUT_MS")?
                .unwrap_or(DEFAULT_RETRIEVAL_TIMEOUT),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_retrieval_timeout(mut self, retrieval_timeout: Duration) -> Self {
        self.retrieval_timeout = retrieval_timeout;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.broker_url.is_empty() {
            anyhow::bail!("broker_url cannot be empty");
        }

        if !self.broker_url.starts_with("http://") && !self.broker_url.starts_with("https://") {
            anyhow::bail!("broker_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.deadline.is_zero() {
            anyhow::bail!("deadline must be greater than 0");
        }

        if self.retrieval_timeout.is_zero() {
            anyhow::bail!("retrieval_timeout must be greater than 0");
        }

        if self.poll_interval >= self.deadline {
            anyhow::bail!("poll_interval must be shorter than the deadline");
        }

        if self.retrieval_timeout > self.deadline {
            anyhow::bail!("retrieval_timeout cannot exceed the deadline");
        }

        Ok(())
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BROKER_URL)
    }
}

/// Reads an optional millisecond duration; malformed values are errors
fn env_millis(key: &str) -> anyhow::Result<Option<Duration>> {
    match std::env::var(key) {
        Ok(raw) => {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow::anyhow!("{} must be a number of milliseconds: {}", key, e))?;
            Ok(Some(Duration::from_millis(millis)))
        }
        Err(_) => Ok(None),
    }
}
