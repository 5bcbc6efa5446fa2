//! Core domain types
//!
//! These types represent the fundamental business entities and are shared
//! between the API server (for persistence) and the CLI (for display).

pub mod feedback;
pub mod profile;
pub mod session;
