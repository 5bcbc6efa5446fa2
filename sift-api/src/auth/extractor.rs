//! Session cookie extractor for axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sift_core::domain::profile::Profile;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::service::session;
use crate::state::AppState;

/// The profile owning the request's session cookie
///
/// A missing or tampered cookie is rejected with 400, a session that does
/// not exist (any more) with 401.
#[derive(Debug, Clone)]
pub struct CurrentProfile {
    pub session_id: Uuid,
    pub profile: Profile,
}

impl FromRequestParts<AppState> for CurrentProfile {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session_id = state.cookies.verify_headers(&parts.headers)?;

        let profile =
            session::authenticate(state.profiles.as_ref(), state.sessions.as_ref(), session_id)
                .await?;

        Ok(CurrentProfile {
            session_id,
            profile,
        })
    }
}
