//! Job records and results

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::TaskError;

/// Outcome of a single job, written once to its completion channel
pub type JobResult = std::result::Result<Value, TaskError>;

/// A unit of work ready for submission
///
/// Built when a job is dispatched and consumed once the broker hands back
/// a handle.
#[derive(Debug, Clone)]
pub struct Job {
    pub name: String,
    pub payload: Vec<u8>,
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    /// Encodes `payload` as JSON and stamps the submission time
    ///
    /// Fails without touching the network when the name is empty or the
    /// payload cannot be serialized.
    pub fn encode<P: Serialize + ?Sized>(
        name: impl Into<String>,
        payload: &P,
    ) -> Result<Self, TaskError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TaskError::EmptyTaskName);
        }

        let payload = serde_json::to_vec(payload)?;

        Ok(Self {
            name,
            payload,
            submitted_at: Utc::now(),
        })
    }
}
