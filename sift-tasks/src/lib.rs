//! Sift task dispatch
//!
//! Client-side orchestration for NLP jobs executed by an external task
//! queue. A job is submitted under a task name, polled on a fixed cadence
//! until it is ready or an overall deadline passes, and its value is then
//! fetched under a separate, shorter timeout. The single outcome is handed
//! back on a one-shot channel.
//!
//! # Example
//!
//! ```no_run
//! use sift_tasks::{TaskConfig, TaskDispatcher};
//! use tokio::sync::oneshot;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dispatcher = TaskDispatcher::connect(TaskConfig::new("http://localhost:5555"))?;
//!
//!     let (tx, rx) = oneshot::channel();
//!     dispatcher.run("sift.jobrunner.jobs.sample.run", &serde_json::json!({"x": 1}), tx);
//!
//!     let value = rx.await??;
//!     println!("Job result: {}", value);
//!     Ok(())
//! }
//! ```

pub mod broker;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod flower;
pub mod job;
pub mod poller;
pub mod retriever;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use broker::{Broker, BrokerHandle};
pub use config::TaskConfig;
pub use dispatcher::TaskDispatcher;
pub use error::{BrokerError, Result, TaskError};
pub use flower::FlowerBroker;
pub use job::{Job, JobResult};
pub use poller::{PollLoop, PollOutcome};
pub use retriever::ResultRetriever;
pub use tokio_util::sync::CancellationToken;
