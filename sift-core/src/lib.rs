//! Sift Core
//!
//! Core types shared by the Sift API server and CLI.
//!
//! This crate contains:
//! - Domain types: Core business entities (Profile, Session, Feedback)
//! - DTOs: Request and response bodies exchanged with the API
//! - Feedback preprocessing: normalizing uploaded review dumps

pub mod domain;
pub mod dto;
pub mod feedback;
