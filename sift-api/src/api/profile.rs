//! Profile API Handlers
//!
//! Registration is open; every other endpoint acts on the profile owning
//! the session cookie.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use sift_core::domain::profile::Profile;
use sift_core::dto::profile::{CreateProfile, UpdateProfile};

use crate::api::error::ApiResult;
use crate::auth::{CurrentProfile, SessionCookie};
use crate::service::profile as profile_service;
use crate::state::AppState;

/// POST /profiles
/// Register a new company
pub async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<CreateProfile>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    tracing::info!("Creating profile: {}", req.company_name);

    let profile = profile_service::create_profile(state.profiles.as_ref(), req).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /profile
pub async fn get_profile(current: CurrentProfile) -> Json<Profile> {
    Json(current.profile)
}

/// PUT /profile
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentProfile,
    Json(req): Json<UpdateProfile>,
) -> ApiResult<Json<Profile>> {
    let profile =
        profile_service::update_profile(state.profiles.as_ref(), current.profile.id, req).await?;

    Ok(Json(profile))
}

/// DELETE /profile
/// Remove the profile and end its sessions
pub async fn delete_profile(
    State(state): State<AppState>,
    current: CurrentProfile,
) -> ApiResult<Response> {
    profile_service::delete_profile(
        state.profiles.as_ref(),
        state.sessions.as_ref(),
        current.profile.id,
    )
    .await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, SessionCookie::clear_header())],
    )
        .into_response())
}
