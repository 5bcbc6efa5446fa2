//! Feedback service
//!
//! Turns an uploaded review dump into the payload of the NLP job.

use serde::Serialize;
use serde_json::Value;
use sift_core::domain::feedback::Feedback;
use sift_core::feedback::{self, FeedbackError};

/// Payload forwarded to the feedback task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeedbackPayload {
    /// Loose JSON converted into numbered records
    Normalized(Vec<Feedback>),
    /// Well-formed JSON forwarded untouched
    Raw(Value),
}

impl FeedbackPayload {
    pub fn len_hint(&self) -> Option<usize> {
        match self {
            FeedbackPayload::Normalized(records) => Some(records.len()),
            FeedbackPayload::Raw(Value::Array(items)) => Some(items.len()),
            FeedbackPayload::Raw(_) => None,
        }
    }
}

pub fn prepare_payload(input: &[u8]) -> Result<FeedbackPayload, FeedbackError> {
    if feedback::is_loose_json(input) {
        let records = feedback::process_json(input)?;
        tracing::debug!(records = records.len(), "Normalized loose feedback JSON");
        return Ok(FeedbackPayload::Normalized(records));
    }

    let value = serde_json::from_slice(input)
        .map_err(|source| FeedbackError::InvalidJson { index: 0, source })?;
    Ok(FeedbackPayload::Raw(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loose_json_is_normalized() {
        let input = br#"{"reviewText": "great"}
{"reviewText": "awful"}"#;

        let payload = prepare_payload(input).unwrap();
        assert_eq!(
            payload,
            FeedbackPayload::Normalized(vec![
                Feedback::new(0, "great"),
                Feedback::new(1, "awful"),
            ])
        );
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!([{"fb_id": 0, "fb_body": "great"}, {"fb_id": 1, "fb_body": "awful"}])
        );
    }

    #[test]
    fn test_well_formed_json_is_forwarded() {
        let input = br#"[{"fb_id": 7, "fb_body": "already clean"}]"#;

        let payload = prepare_payload(input).unwrap();
        assert_eq!(
            payload,
            FeedbackPayload::Raw(json!([{"fb_id": 7, "fb_body": "already clean"}]))
        );
        assert_eq!(payload.len_hint(), Some(1));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(prepare_payload(b"this is not json").is_err());
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        assert!(prepare_payload(b"").is_err());
    }
}
