//! Session DTOs

use serde::{Deserialize, Serialize};

/// Credentials submitted to `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub company_name: String,
    pub password: String,
}
