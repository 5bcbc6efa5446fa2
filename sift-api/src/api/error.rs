//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sift_core::feedback::FeedbackError;
use sift_tasks::TaskError;

use crate::auth::CookieError;
use crate::repository::RepositoryError;
use crate::service::profile::ProfileError;
use crate::service::session::SessionError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    DatabaseError(RepositoryError),
    InternalError(String),
    /// The dispatched job did not produce a value
    Task(TaskError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApiError::Task(err) => {
                tracing::warn!(error = %err, "Task failed");
                let status = if err.is_timeout() {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (status, err.to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::DatabaseError(other),
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        ApiError::Task(err)
    }
}

impl From<FeedbackError> for ApiError {
    fn from(err: FeedbackError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<CookieError> for ApiError {
    fn from(err: CookieError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(id) => ApiError::NotFound(format!("Profile {} not found", id)),
            ProfileError::ValidationError(msg) => ApiError::BadRequest(msg),
            ProfileError::Conflict(msg) => ApiError::Conflict(msg),
            ProfileError::PasswordHash(msg) => ApiError::InternalError(msg),
            ProfileError::Repository(err) => err.into(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::ValidationError(msg) => ApiError::BadRequest(msg),
            SessionError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid company name or password".to_string())
            }
            SessionError::UnknownSession(_) => {
                ApiError::Unauthorized("Session expired or unknown".to_string())
            }
            SessionError::PasswordHash(msg) => ApiError::InternalError(msg),
            SessionError::Repository(err) => err.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_task_status_codes() {
        let timed_out = ApiError::Task(TaskError::TimedOut {
            task: "lda".to_string(),
            deadline: Duration::from_secs(10),
        });
        assert_eq!(timed_out.into_response().status(), StatusCode::GATEWAY_TIMEOUT);

        let unavailable = ApiError::Task(TaskError::EmptyTaskName);
        assert_eq!(unavailable.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_domain_error_mapping() {
        let err: ApiError = ProfileError::Conflict("taken".to_string()).into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = SessionError::InvalidCredentials.into();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);

        let err: ApiError = CookieError::BadSignature.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
