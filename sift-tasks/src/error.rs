//! Error types for task dispatch

use std::time::Duration;

use thiserror::Error;

/// Errors reported by a broker implementation
#[derive(Debug, Error)]
pub enum BrokerError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Broker returned an error status code
    #[error("Broker error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the broker
        message: String,
    },

    /// Failed to parse a broker response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Payload bytes are not in the broker's wire format
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The task finished in a failed state
    #[error("Task finished in state {state}: {message}")]
    TaskFailed { state: String, message: String },

    /// A result was requested before the task reached a ready state
    #[error("Task not ready (state {0})")]
    NotReady(String),

    /// The operation did not complete in time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl BrokerError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }
}

/// Terminal failure of a job, delivered on its completion channel
#[derive(Debug, Error)]
pub enum TaskError {
    /// Task name was empty; nothing was sent to the broker
    #[error("Task name must not be empty")]
    EmptyTaskName,

    /// Payload could not be encoded; nothing was sent to the broker
    #[error("Failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Submission to the broker failed
    #[error("Broker unavailable while submitting {task}: {source}")]
    BrokerUnavailable {
        task: String,
        #[source]
        source: BrokerError,
    },

    /// A readiness query failed mid-loop
    #[error("Polling {task} failed: {source}")]
    PollFailed {
        task: String,
        #[source]
        source: BrokerError,
    },

    /// The overall deadline elapsed before the job was ready
    #[error("Request timed out to retrieve job {task} with timeout {deadline:?}")]
    TimedOut { task: String, deadline: Duration },

    /// The job was ready but its value could not be fetched
    #[error("Failed to retrieve result of {task}: {source}")]
    Retrieval {
        task: String,
        #[source]
        source: BrokerError,
    },

    /// Polling was abandoned through a cancellation token
    #[error("Job {task} was cancelled")]
    Cancelled { task: String },

    /// The background task ended without delivering a result
    #[error("Job ended without delivering a result")]
    ChannelClosed,
}

impl TaskError {
    /// Check if the job failed before a handle was obtained
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyTaskName | Self::Serialization(_) | Self::BrokerUnavailable { .. }
        )
    }

    /// Check if the job ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, TaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_classification() {
        assert!(TaskError::EmptyTaskName.is_dispatch_error());
        assert!(
            TaskError::BrokerUnavailable {
                task: "t".to_string(),
                source: BrokerError::api_error(503, "down"),
            }
            .is_dispatch_error()
        );
        assert!(
            !TaskError::TimedOut {
                task: "t".to_string(),
                deadline: Duration::from_secs(1),
            }
            .is_dispatch_error()
        );
    }

    #[test]
    fn test_timed_out_message_names_task() {
        let err = TaskError::TimedOut {
            task: "sift.jobrunner.jobs.sample.run".to_string(),
            deadline: Duration::from_secs(10),
        };
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "Request timed out to retrieve job sift.jobrunner.jobs.sample.run with timeout 10s"
        );
    }
}
