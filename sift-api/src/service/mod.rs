//! Service Layer
//!
//! Business logic for the API server. Services operate on the repository
//! traits and know nothing about HTTP.

pub mod feedback;
pub mod profile;
pub mod session;
