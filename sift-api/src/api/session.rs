//! Session API Handlers

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use sift_core::dto::session::LoginRequest;

use crate::api::error::ApiResult;
use crate::auth::{CookieError, SessionCookie};
use crate::service::session as session_service;
use crate::state::AppState;

/// Where a successful login lands
pub const DASHBOARD_PATH: &str = "/dashboard";

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    let session =
        session_service::login(state.profiles.as_ref(), state.sessions.as_ref(), req).await?;

    Ok(found(DASHBOARD_PATH, state.cookies.set_header(session.id)))
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let session_id = match state.cookies.verify_headers(&headers) {
        Ok(id) => id,
        Err(CookieError::Missing) => return Ok(found("/", SessionCookie::clear_header())),
        Err(err) => return Err(err.into()),
    };

    session_service::logout(state.sessions.as_ref(), session_id).await?;

    Ok(found("/", SessionCookie::clear_header()))
}

fn found(location: &'static str, cookie: HeaderValue) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, HeaderValue::from_static(location)),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}
