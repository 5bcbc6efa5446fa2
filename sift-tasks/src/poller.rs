//! Poll loop
//!
//! Drives a broker handle to a terminal outcome: repeatedly asks whether the
//! job is ready on a fixed cadence until it is, a query fails, the deadline
//! passes, or the caller cancels.
//!
//! The deadline check runs before the readiness check on every tick, so a
//! job that becomes ready exactly at the deadline is reported as timed out.

use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::broker::BrokerHandle;
use crate::config::TaskConfig;
use crate::error::{BrokerError, TaskError};

/// Result of a single poll tick
#[derive(Debug)]
pub enum PollOutcome {
    /// Not ready yet; sleep and poll again
    Pending,
    /// The job reached a ready state
    Ready,
    /// A readiness query returned an error
    PollFailed(BrokerError),
    /// The overall deadline elapsed first
    TimedOut,
    /// The cancellation token fired
    Cancelled,
}

/// Fixed-interval readiness poller bounded by a wall-clock deadline
#[derive(Debug, Clone, Copy)]
pub struct PollLoop {
    interval: Duration,
    deadline: Duration,
}

impl PollLoop {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }

    pub fn from_config(config: &TaskConfig) -> Self {
        Self::new(config.poll_interval, config.deadline)
    }

    /// Polls `handle` until it is ready
    ///
    /// The deadline is measured from the moment this is called, which is
    /// right after the handle was obtained.
    ///
    /// # Arguments
    /// * `task` - Task name, used for errors and logs
    /// * `handle` - Handle of the submitted job
    /// * `cancel` - Token checked before each tick and during the sleep
    pub async fn drive(
        &self,
        task: &str,
        handle: &dyn BrokerHandle,
        cancel: &CancellationToken,
    ) -> Result<(), TaskError> {
        let began_at = Instant::now();
        let mut ticks = 0u32;

        loop {
            ticks += 1;

            match self.tick(handle, began_at, cancel).await {
                PollOutcome::Pending => {
                    trace!(task, task_id = handle.id(), ticks, "Job not ready");
                }
                PollOutcome::Ready => {
                    debug!(
                        task,
                        task_id = handle.id(),
                        ticks,
                        elapsed_ms = began_at.elapsed().as_millis() as u64,
                        "Job ready"
                    );
                    return Ok(());
                }
                PollOutcome::PollFailed(source) => {
                    warn!(task, task_id = handle.id(), ticks, "Readiness query failed: {}", source);
                    return Err(TaskError::PollFailed {
                        task: task.to_string(),
                        source,
                    });
                }
                PollOutcome::TimedOut => {
                    warn!(
                        task,
                        task_id = handle.id(),
                        ticks,
                        elapsed_ms = began_at.elapsed().as_millis() as u64,
                        "Job timed out"
                    );
                    return Err(TaskError::TimedOut {
                        task: task.to_string(),
                        deadline: self.deadline,
                    });
                }
                PollOutcome::Cancelled => {
                    debug!(task, task_id = handle.id(), ticks, "Polling cancelled");
                    return Err(TaskError::Cancelled {
                        task: task.to_string(),
                    });
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(task, task_id = handle.id(), "Polling cancelled during sleep");
                    return Err(TaskError::Cancelled { task: task.to_string() });
                }
                _ = time::sleep(self.interval) => {}
            }
        }
    }

    /// Evaluates one tick: cancellation, then deadline, then readiness
    async fn tick(
        &self,
        handle: &dyn BrokerHandle,
        began_at: Instant,
        cancel: &CancellationToken,
    ) -> PollOutcome {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        if began_at.elapsed() >= self.deadline {
            return PollOutcome::TimedOut;
        }

        match handle.ready().await {
            Ok(true) => PollOutcome::Ready,
            Ok(false) => PollOutcome::Pending,
            Err(e) => PollOutcome::PollFailed(e),
        }
    }
}
