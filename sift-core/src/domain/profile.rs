//! Profile domain model
//!
//! A profile is the account of a company using Sift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A company profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier for the profile
    pub id: Uuid,

    /// Company name, unique across profiles and used to log in
    pub company_name: String,

    /// Postal address of the company
    pub address: String,

    /// Argon2id PHC string; never leaves the server
    #[serde(skip_serializing, default)]
    pub pw_hash: String,

    /// When the profile was created
    pub created_at: DateTime<Utc>,

    /// Last time the profile was modified
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Returns a copy of the profile with the password hash removed
    pub fn stripped(mut self) -> Self {
        self.pw_hash.clear();
        self
    }
}
