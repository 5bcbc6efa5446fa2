//! Broker contract
//!
//! The dispatcher only consumes these traits; concrete brokers live in
//! their own modules ([`crate::flower`]) or in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BrokerError;

/// Connection to an external task queue
///
/// Implementations must be safe for concurrent submission: one broker is
/// shared by every job the process dispatches.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Submits a unit of work under `task_name`
    ///
    /// # Arguments
    /// * `task_name` - Name of the registered task to run
    /// * `payload` - Serialized task argument
    ///
    /// # Returns
    /// A handle to poll and fetch the job's outcome
    async fn submit(
        &self,
        task_name: &str,
        payload: Vec<u8>,
    ) -> Result<Box<dyn BrokerHandle>, BrokerError>;
}

/// Broker-issued reference to one submitted job
///
/// Each handle is owned by exactly one poll loop.
#[async_trait]
pub trait BrokerHandle: Send + Sync {
    /// Broker-side identifier of the job
    fn id(&self) -> &str;

    /// Asks whether the job has reached a ready state
    async fn ready(&self) -> Result<bool, BrokerError>;

    /// Fetches the job's value, waiting at most `timeout`
    async fn get(&self, timeout: Duration) -> Result<Value, BrokerError>;
}
