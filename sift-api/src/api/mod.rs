//! API Module
//!
//! HTTP API layer for the Sift server.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod feedback;
pub mod health;
pub mod profile;
pub mod session;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Feedback upload
        .route(
            "/feedback",
            post(feedback::upload_feedback).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        // Profile endpoints
        .route("/profiles", post(profile::create_profile))
        .route(
            "/profile",
            get(profile::get_profile)
                .put(profile::update_profile)
                .delete(profile::delete_profile),
        )
        // Session endpoints
        .route("/login", post(session::login))
        .route("/logout", post(session::logout))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
