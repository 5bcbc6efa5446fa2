//! Result retrieval
//!
//! Fetches the value of a job that already reported ready. The retrieval
//! budget is separate from the overall deadline: a ready job should have
//! its value at hand, so a long stall here is a broker fault.

use std::time::Duration;

use serde_json::Value;
use tokio::time;
use tracing::{debug, warn};

use crate::broker::BrokerHandle;
use crate::error::{BrokerError, TaskError};

/// Fetches results under a fixed timeout
#[derive(Debug, Clone, Copy)]
pub struct ResultRetriever {
    timeout: Duration,
}

impl ResultRetriever {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Fetches the value behind a ready handle
    ///
    /// The timeout is passed to the broker and also enforced locally, so a
    /// broker that ignores it still cannot stall the job.
    pub async fn fetch(&self, task: &str, handle: &dyn BrokerHandle) -> Result<Value, TaskError> {
        let fetched = match time::timeout(self.timeout, handle.get(self.timeout)).await {
            Ok(result) => result,
            Err(_) => Err(BrokerError::Timeout(self.timeout)),
        };

        match fetched {
            Ok(value) => {
                debug!(task, task_id = handle.id(), "Retrieved job result");
                Ok(value)
            }
            Err(source) => {
                warn!(task, task_id = handle.id(), "Failed to retrieve job result: {}", source);
                Err(TaskError::Retrieval {
                    task: task.to_string(),
                    source,
                })
            }
        }
    }
}
