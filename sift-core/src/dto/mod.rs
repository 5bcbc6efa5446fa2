//! Data Transfer Objects
//!
//! Request bodies accepted by the API server. DTOs carry plaintext inputs
//! (such as passwords) that never appear in the domain types.

pub mod profile;
pub mod session;
