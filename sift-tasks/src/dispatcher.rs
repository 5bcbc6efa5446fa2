//! Task dispatcher
//!
//! Submits jobs to the broker and runs each one to completion in its own
//! tokio task: dispatch, then poll, then retrieve, strictly in sequence.
//! Every job delivers exactly one [`JobResult`] on its completion channel.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::broker::{Broker, BrokerHandle};
use crate::config::TaskConfig;
use crate::error::TaskError;
use crate::flower::FlowerBroker;
use crate::job::{Job, JobResult};
use crate::poller::PollLoop;
use crate::retriever::ResultRetriever;

/// Dispatches jobs to a shared broker connection
///
/// Construct one per process and clone it into handlers; clones share the
/// broker connection.
#[derive(Clone)]
pub struct TaskDispatcher {
    broker: Arc<dyn Broker>,
    config: TaskConfig,
}

impl TaskDispatcher {
    /// Create a dispatcher over an existing broker connection
    pub fn new(broker: Arc<dyn Broker>, config: TaskConfig) -> Self {
        Self { broker, config }
    }

    /// Create a dispatcher talking to the Flower API at `config.broker_url`
    pub fn connect(config: TaskConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let broker = FlowerBroker::new(config.broker_url.clone());
        Ok(Self::new(Arc::new(broker), config))
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Submit a job and return its handle
    ///
    /// Fails with [`TaskError::EmptyTaskName`] or [`TaskError::Serialization`]
    /// before any network call, and with [`TaskError::BrokerUnavailable`] when
    /// the broker rejects the submission. Nothing is retried.
    pub async fn submit<P: Serialize + ?Sized>(
        &self,
        name: &str,
        payload: &P,
    ) -> Result<Box<dyn BrokerHandle>, TaskError> {
        let job = Job::encode(name, payload)?;
        self.submit_job(job).await
    }

    /// Run a job in the background and deliver its result on `reply`
    ///
    /// Returns immediately. The spawned task sends exactly one result, on
    /// every path, then ends.
    pub fn run<P: Serialize + ?Sized>(
        &self,
        name: &str,
        payload: &P,
        reply: oneshot::Sender<JobResult>,
    ) -> JoinHandle<()> {
        self.run_with_cancel(name, payload, reply, CancellationToken::new())
    }

    /// Like [`run`](Self::run), but polling stops early when `cancel` fires
    ///
    /// Cancellation is observed before each poll tick and during the sleep
    /// between ticks; it does not interrupt an in-flight broker call.
    pub fn run_with_cancel<P: Serialize + ?Sized>(
        &self,
        name: &str,
        payload: &P,
        reply: oneshot::Sender<JobResult>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        // Encode eagerly so the payload does not need to outlive this call
        let job = Job::encode(name, payload);
        let task = name.to_string();
        let dispatcher = self.clone();

        tokio::spawn(async move {
            let result = match job {
                Ok(job) => dispatcher.execute(job, &cancel).await,
                Err(e) => Err(e),
            };

            match &result {
                Ok(_) => info!(task = %task, "Job completed"),
                Err(e) => warn!(task = %task, "Job failed: {}", e),
            }

            if reply.send(result).is_err() {
                debug!(task = %task, "Result receiver dropped before delivery");
            }
        })
    }

    /// Run a job and wait for its result
    pub async fn dispatch<P: Serialize + ?Sized>(&self, name: &str, payload: &P) -> JobResult {
        let (reply, result) = oneshot::channel();
        self.run(name, payload, reply);
        result.await.unwrap_or(Err(TaskError::ChannelClosed))
    }

    async fn submit_job(&self, job: Job) -> Result<Box<dyn BrokerHandle>, TaskError> {
        let Job {
            name,
            payload,
            submitted_at,
        } = job;

        debug!(task = %name, bytes = payload.len(), "Submitting job");

        let handle = self
            .broker
            .submit(&name, payload)
            .await
            .map_err(|source| TaskError::BrokerUnavailable {
                task: name.clone(),
                source,
            })?;

        info!(
            task = %name,
            task_id = handle.id(),
            submitted_at = %submitted_at,
            "Job submitted"
        );

        Ok(handle)
    }

    async fn execute(&self, job: Job, cancel: &CancellationToken) -> JobResult {
        let task = job.name.clone();
        let handle = self.submit_job(job).await?;

        PollLoop::from_config(&self.config)
            .drive(&task, handle.as_ref(), cancel)
            .await?;

        ResultRetriever::new(self.config.retrieval_timeout)
            .fetch(&task, handle.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrokerError;
    use crate::testing::MockBroker;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::Instant;

    fn config(deadline: Duration) -> TaskConfig {
        TaskConfig::default()
            .with_poll_interval(Duration::from_millis(50))
            .with_deadline(deadline)
            .with_retrieval_timeout(Duration::from_secs(1))
    }

    fn dispatcher(broker: &MockBroker, deadline: Duration) -> TaskDispatcher {
        TaskDispatcher::new(Arc::new(broker.clone()), config(deadline))
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_job_succeeds_after_three_pending_ticks() {
        let broker = MockBroker::ready_after(3, json!({"y": 2}));
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));

        let (tx, rx) = oneshot::channel();
        let started = Instant::now();
        dispatcher.run("sample", &json!({"x": 1}), tx);
        let result = rx.await.unwrap();

        assert_eq!(result.unwrap(), json!({"y": 2}));
        assert_eq!(started.elapsed(), Duration::from_millis(150));
        assert_eq!(
            broker.submitted(),
            vec![("sample".to_string(), br#"{"x":1}"#.to_vec())]
        );
        assert_eq!(broker.get_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_makes_no_polls() {
        let broker = MockBroker::failing_submit();
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));

        let started = Instant::now();
        let err = dispatcher.dispatch("sample", &json!({"x": 1})).await.unwrap_err();

        assert!(matches!(err, TaskError::BrokerUnavailable { .. }));
        assert!(err.is_dispatch_error());
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(broker.submit_count(), 1);
        assert_eq!(broker.poll_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanently_pending_job_times_out() {
        let broker = MockBroker::never_ready();
        let dispatcher = dispatcher(&broker, Duration::from_millis(200));

        let started = Instant::now();
        let err = dispatcher.dispatch("sample", &json!({"x": 1})).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(err.is_timeout());
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(250));
        assert_eq!(broker.get_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_success_skips_poll_interval() {
        let broker = MockBroker::ready_after(0, json!("done"));
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));

        let started = Instant::now();
        let value = dispatcher.dispatch("sample", &()).await.unwrap();

        assert_eq!(value, json!("done"));
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failure_is_delivered() {
        let broker = MockBroker::never_ready().with_poll_error_after(1);
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));

        let err = dispatcher.dispatch("sample", &()).await.unwrap_err();
        assert!(matches!(err, TaskError::PollFailed { .. }));
        assert_eq!(broker.get_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrieval_failure_is_delivered() {
        let broker = MockBroker::ready_after(1, json!(null)).with_get_error("worker crashed");
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));

        let err = dispatcher.dispatch("sample", &()).await.unwrap_err();
        assert!(matches!(
            err,
            TaskError::Retrieval {
                source: BrokerError::TaskFailed { .. },
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_name_never_reaches_broker() {
        let broker = MockBroker::ready_after(0, json!(1));
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));

        let err = dispatcher.dispatch("", &()).await.unwrap_err();
        assert!(matches!(err, TaskError::EmptyTaskName));
        assert_eq!(broker.submit_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_serialization_failure_does_not_affect_other_job() {
        use std::collections::HashMap;

        let broker = MockBroker::ready_after(2, json!({"ok": true}));
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));

        // Maps with non-string keys cannot be encoded as JSON
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple key");

        let (tx_a, rx_a) = oneshot::channel();
        let (tx_b, rx_b) = oneshot::channel();
        let started = Instant::now();
        dispatcher.run("job-a", &bad, tx_a);
        dispatcher.run("job-b", &json!({"x": 1}), tx_b);

        let a = rx_a.await.unwrap();
        assert!(matches!(a, Err(TaskError::Serialization(_))));

        let b = rx_b.await.unwrap();
        assert_eq!(b.unwrap(), json!({"ok": true}));
        assert_eq!(started.elapsed(), Duration::from_millis(100));
        assert_eq!(broker.submit_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_job_delivers_cancelled() {
        let broker = MockBroker::never_ready();
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));
        let cancel = CancellationToken::new();

        let (tx, rx) = oneshot::channel();
        dispatcher.run_with_cancel("sample", &(), tx, cancel.clone());

        tokio::time::sleep(Duration::from_millis(120)).await;
        cancel.cancel();

        let err = rx.await.unwrap().unwrap_err();
        assert!(matches!(err, TaskError::Cancelled { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_receiver_does_not_panic_task() {
        let broker = MockBroker::ready_after(0, json!(1));
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));

        let (tx, rx) = oneshot::channel();
        drop(rx);
        let handle = dispatcher.run("sample", &(), tx);

        assert!(handle.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exactly_one_result_on_every_path() {
        let cases = vec![
            MockBroker::failing_submit(),
            MockBroker::never_ready().with_poll_error_after(0),
            MockBroker::never_ready(),
            MockBroker::ready_after(1, json!(null)).with_get_error("boom"),
            MockBroker::ready_after(1, json!("ok")),
        ];

        for broker in cases {
            let dispatcher = dispatcher(&broker, Duration::from_millis(200));
            let (tx, mut rx) = oneshot::channel();
            let handle = dispatcher.run("sample", &(), tx);

            handle.await.unwrap();
            // The sender is consumed by the one delivery, so the value is
            // there and the channel is closed behind it
            assert!(rx.try_recv().is_ok());
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_submit_returns_broker_handle() {
        let broker = MockBroker::ready_after(0, json!(null));
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));

        let handle = dispatcher.submit("sample", &json!({"x": 1})).await.unwrap();

        assert_eq!(handle.id(), "mock-1");
        assert_eq!(broker.submit_count(), 1);
        assert_eq!(broker.poll_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_empty_name_makes_no_call() {
        let broker = MockBroker::ready_after(0, json!(null));
        let dispatcher = dispatcher(&broker, Duration::from_secs(10));

        let Err(err) = dispatcher.submit("  ", &json!({"x": 1})).await else {
            panic!("empty task name was submitted");
        };

        assert!(matches!(err, TaskError::EmptyTaskName));
        assert_eq!(broker.submit_count(), 0);
    }

    #[test]
    fn test_connect_keeps_config() {
        let config = TaskConfig::new("http://flower:5555").with_deadline(Duration::from_secs(3));
        let dispatcher = TaskDispatcher::connect(config).unwrap();
        assert_eq!(dispatcher.config().deadline, Duration::from_secs(3));
    }

    #[test]
    fn test_connect_rejects_invalid_config() {
        let config = TaskConfig::new("not-a-url");
        assert!(TaskDispatcher::connect(config).is_err());
    }
}
