//! Feedback domain types

use serde::{Deserialize, Serialize};

/// A single piece of customer feedback in the normalized format
/// consumed by the NLP jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(rename = "fb_id")]
    pub id: u64,
    #[serde(rename = "fb_body")]
    pub body: String,
}

impl Feedback {
    pub fn new(id: u64, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
        }
    }
}
