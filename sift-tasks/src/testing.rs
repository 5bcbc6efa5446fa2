//! Scripted broker for tests
//!
//! [`MockBroker`] answers readiness queries from a script and records every
//! call, so tests can assert both the outcome of a job and how much broker
//! traffic it caused. Time-based scripts use the tokio clock and work with
//! paused time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use crate::broker::{Broker, BrokerHandle};
use crate::error::BrokerError;

/// When a scripted job reports ready
#[derive(Debug, Clone, Copy)]
enum Readiness {
    /// Ready once this many polls have answered "not ready"
    AfterPolls(usize),
    /// Ready once this much time has passed since submission
    AfterDelay(Duration),
    Never,
}

#[derive(Debug, Clone)]
struct Script {
    fail_submit: bool,
    readiness: Readiness,
    poll_error_after: Option<usize>,
    value: Value,
    get_error: Option<String>,
    get_delay: Duration,
}

#[derive(Debug, Default)]
struct Calls {
    submitted: Vec<(String, Vec<u8>)>,
    polls: usize,
    gets: usize,
}

/// In-memory broker driven by a script
#[derive(Debug, Clone)]
pub struct MockBroker {
    script: Arc<Script>,
    calls: Arc<Mutex<Calls>>,
}

impl MockBroker {
    fn with_script(script: Script) -> Self {
        Self {
            script: Arc::new(script),
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    fn base(readiness: Readiness, value: Value) -> Script {
        Script {
            fail_submit: false,
            readiness,
            poll_error_after: None,
            value,
            get_error: None,
            get_delay: Duration::ZERO,
        }
    }

    /// Reports "not ready" for `pending_polls` polls, then ready with `value`
    pub fn ready_after(pending_polls: usize, value: Value) -> Self {
        Self::with_script(Self::base(Readiness::AfterPolls(pending_polls), value))
    }

    /// Reports ready once `delay` has passed since submission
    pub fn ready_at(delay: Duration, value: Value) -> Self {
        Self::with_script(Self::base(Readiness::AfterDelay(delay), value))
    }

    /// Never reports ready
    pub fn never_ready() -> Self {
        Self::with_script(Self::base(Readiness::Never, Value::Null))
    }

    /// Rejects every submission
    pub fn failing_submit() -> Self {
        let mut script = Self::base(Readiness::Never, Value::Null);
        script.fail_submit = true;
        Self::with_script(script)
    }

    /// Fails the readiness query after `ok_polls` successful ones
    pub fn with_poll_error_after(self, ok_polls: usize) -> Self {
        self.modify(|script| script.poll_error_after = Some(ok_polls))
    }

    /// Fails retrieval with a task failure carrying `message`
    pub fn with_get_error(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.modify(|script| script.get_error = Some(message))
    }

    /// Delays retrieval by `delay`
    pub fn with_get_delay(self, delay: Duration) -> Self {
        self.modify(|script| script.get_delay = delay)
    }

    fn modify(self, f: impl FnOnce(&mut Script)) -> Self {
        let mut script = Arc::unwrap_or_clone(self.script);
        f(&mut script);
        Self {
            script: Arc::new(script),
            calls: self.calls,
        }
    }

    /// Number of submissions, failed ones included
    pub fn submit_count(&self) -> usize {
        self.lock().submitted.len()
    }

    /// Task names and payloads in submission order
    pub fn submitted(&self) -> Vec<(String, Vec<u8>)> {
        self.lock().submitted.clone()
    }

    /// Number of readiness queries across all handles
    pub fn poll_count(&self) -> usize {
        self.lock().polls
    }

    /// Number of retrieval calls across all handles
    pub fn get_count(&self) -> usize {
        self.lock().gets
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().expect("mock broker call log poisoned")
    }
}

#[async_trait]
impl Broker for MockBroker {
    async fn submit(
        &self,
        task_name: &str,
        payload: Vec<u8>,
    ) -> Result<Box<dyn BrokerHandle>, BrokerError> {
        let id = {
            let mut calls = self.lock();
            calls.submitted.push((task_name.to_string(), payload));
            format!("mock-{}", calls.submitted.len())
        };

        if self.script.fail_submit {
            return Err(BrokerError::api_error(503, "broker unavailable"));
        }

        Ok(Box::new(MockHandle {
            id,
            submitted_at: Instant::now(),
            broker: self.clone(),
        }))
    }
}

struct MockHandle {
    id: String,
    submitted_at: Instant,
    broker: MockBroker,
}

#[async_trait]
impl BrokerHandle for MockHandle {
    fn id(&self) -> &str {
        &self.id
    }

    async fn ready(&self) -> Result<bool, BrokerError> {
        let script = &self.broker.script;
        let polls = {
            let mut calls = self.broker.lock();
            calls.polls += 1;
            calls.polls
        };

        if let Some(ok_polls) = script.poll_error_after
            && polls > ok_polls
        {
            return Err(BrokerError::api_error(500, "result backend unreachable"));
        }

        Ok(match script.readiness {
            Readiness::AfterPolls(pending) => polls > pending,
            Readiness::AfterDelay(delay) => self.submitted_at.elapsed() >= delay,
            Readiness::Never => false,
        })
    }

    async fn get(&self, _timeout: Duration) -> Result<Value, BrokerError> {
        self.broker.lock().gets += 1;

        let script = &self.broker.script;
        if !script.get_delay.is_zero() {
            tokio::time::sleep(script.get_delay).await;
        }

        match &script.get_error {
            Some(message) => Err(BrokerError::TaskFailed {
                state: "FAILURE".to_string(),
                message: message.clone(),
            }),
            None => Ok(script.value.clone()),
        }
    }
}
