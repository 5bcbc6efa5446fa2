//! Flower broker
//!
//! Submits Celery tasks and reads their results through the Flower REST
//! API:
//! - `POST /api/task/async-apply/{name}` with `{"args": [payload]}`
//! - `GET /api/task/result/{id}` for the task state and result

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::broker::{Broker, BrokerHandle};
use crate::error::BrokerError;

/// Celery task state as reported by Flower
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Received,
    Started,
    Retry,
    Success,
    Failure,
    Revoked,
    Other(String),
}

impl TaskState {
    pub fn parse(state: &str) -> Self {
        match state {
            "PENDING" => Self::Pending,
            "RECEIVED" => Self::Received,
            "STARTED" => Self::Started,
            "RETRY" => Self::Retry,
            "SUCCESS" => Self::Success,
            "FAILURE" => Self::Failure,
            "REVOKED" => Self::Revoked,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether Celery considers the task finished
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Revoked)
    }
}

/// Broker backed by a Flower instance in front of Celery
#[derive(Debug, Clone)]
pub struct FlowerBroker {
    /// Base URL of the Flower API (e.g., "http://localhost:5555")
    base_url: String,
    client: Client,
}

impl FlowerBroker {
    /// Create a broker for the Flower API at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a broker with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn apply_url(&self, task_name: &str) -> String {
        format!("{}/api/task/async-apply/{}", self.base_url, task_name)
    }
}

#[async_trait]
impl Broker for FlowerBroker {
    async fn submit(
        &self,
        task_name: &str,
        payload: Vec<u8>,
    ) -> Result<Box<dyn BrokerHandle>, BrokerError> {
        let arg: Value = serde_json::from_slice(&payload)
            .map_err(|e| BrokerError::InvalidPayload(e.to_string()))?;

        let response = self
            .client
            .post(self.apply_url(task_name))
            .json(&ApplyRequest { args: vec![arg] })
            .send()
            .await?;

        let applied: ApplyResponse = handle_response(response).await?;
        debug!(task = task_name, task_id = %applied.task_id, "Flower accepted task");

        Ok(Box::new(FlowerHandle {
            id: applied.task_id,
            base_url: self.base_url.clone(),
            client: self.client.clone(),
        }))
    }
}

/// Handle to a task submitted through Flower
#[derive(Debug)]
pub struct FlowerHandle {
    id: String,
    base_url: String,
    client: Client,
}

impl FlowerHandle {
    fn result_url(&self, timeout: Option<Duration>) -> String {
        let url = format!("{}/api/task/result/{}", self.base_url, self.id);
        match timeout {
            Some(timeout) => format!("{}?timeout={}", url, timeout.as_secs_f64()),
            None => url,
        }
    }

    async fn fetch_result(&self, timeout: Option<Duration>) -> Result<ResultResponse, BrokerError> {
        let mut request = self.client.get(self.result_url(timeout));
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        handle_response(response).await
    }
}

#[async_trait]
impl BrokerHandle for FlowerHandle {
    fn id(&self) -> &str {
        &self.id
    }

    async fn ready(&self) -> Result<bool, BrokerError> {
        let result = self.fetch_result(None).await?;
        Ok(TaskState::parse(&result.state).is_ready())
    }

    async fn get(&self, timeout: Duration) -> Result<Value, BrokerError> {
        let result = self.fetch_result(Some(timeout)).await?;
        result.into_value()
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct ApplyRequest {
    args: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ApplyResponse {
    #[serde(rename = "task-id")]
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct ResultResponse {
    state: String,
    #[serde(default)]
    result: Option<Value>,
}

impl ResultResponse {
    fn into_value(self) -> Result<Value, BrokerError> {
        match TaskState::parse(&self.state) {
            TaskState::Success => Ok(self.result.unwrap_or(Value::Null)),
            TaskState::Failure | TaskState::Revoked => Err(BrokerError::TaskFailed {
                message: match self.result {
                    Some(Value::String(message)) => message,
                    Some(other) => other.to_string(),
                    None => "no error details".to_string(),
                },
                state: self.state,
            }),
            _ => Err(BrokerError::NotReady(self.state)),
        }
    }
}

/// Check the status code and deserialize a JSON body
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BrokerError> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(BrokerError::api_error(status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| BrokerError::ParseError(format!("Failed to parse JSON response: {}", e)))
}
