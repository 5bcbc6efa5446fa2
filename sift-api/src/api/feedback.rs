//! Feedback API Handler
//!
//! Accepts a review dump and runs the NLP job on it.

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult};
use crate::service::feedback::prepare_payload;
use crate::state::AppState;

/// Multipart field carrying the uploaded file
pub const FEEDBACK_FIELD: &str = "feedback";

/// POST /feedback
/// Upload a feedback file and wait for the analysis result
pub async fn upload_feedback(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FEEDBACK_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing \"{FEEDBACK_FIELD}\" file field"))
    })?;

    tracing::info!(
        file = file_name.as_deref().unwrap_or("<unnamed>"),
        size = bytes.len(),
        "Received feedback upload"
    );

    let payload = prepare_payload(&bytes)?;

    tracing::debug!(
        task = %state.feedback_task,
        records = ?payload.len_hint(),
        "Dispatching feedback analysis"
    );

    let result = state
        .dispatcher
        .dispatch(&state.feedback_task, &payload)
        .await?;

    Ok(Json(result))
}
