//! Session service
//!
//! Login, logout and resolution of a session ID to its profile.

use sift_core::domain::profile::Profile;
use sift_core::domain::session::Session;
use sift_core::dto::session::LoginRequest;
use uuid::Uuid;

use crate::auth::password;
use crate::repository::{ProfileRepository, RepositoryError, SessionRepository};

/// Session service error type
#[derive(Debug)]
pub enum SessionError {
    ValidationError(String),
    InvalidCredentials,
    /// The session does not exist or its profile is gone
    UnknownSession(Uuid),
    PasswordHash(String),
    Repository(RepositoryError),
}

impl From<RepositoryError> for SessionError {
    fn from(err: RepositoryError) -> Self {
        SessionError::Repository(err)
    }
}

/// Checks credentials and opens a new session
///
/// Sessions previously held by the profile are discarded.
pub async fn login(
    profiles: &dyn ProfileRepository,
    sessions: &dyn SessionRepository,
    req: LoginRequest,
) -> Result<Session, SessionError> {
    if req.company_name.trim().is_empty() || req.password.is_empty() {
        return Err(SessionError::ValidationError(
            "company_name and password are required".to_string(),
        ));
    }

    let profile = profiles
        .find_by_company(&req.company_name)
        .await?
        .ok_or(SessionError::InvalidCredentials)?;

    let valid = password::verify_password(&req.password, &profile.pw_hash)
        .map_err(|e| SessionError::PasswordHash(e.to_string()))?;
    if !valid {
        tracing::debug!(company = %req.company_name, "Rejected login");
        return Err(SessionError::InvalidCredentials);
    }

    let cleared = sessions.delete_by_user(profile.id).await?;
    let session = sessions.create(Session::new(profile.id)).await?;

    tracing::info!(
        profile_id = %profile.id,
        session_id = %session.id,
        replaced = cleared,
        "Login succeeded"
    );
    Ok(session)
}

/// Ends a session; returns false when it was already gone
pub async fn logout(sessions: &dyn SessionRepository, session_id: Uuid) -> Result<bool, SessionError> {
    let removed = sessions.delete(session_id).await?;
    tracing::info!(session_id = %session_id, removed, "Logout");
    Ok(removed)
}

/// Resolves a verified session ID to its profile, with the hash stripped
pub async fn authenticate(
    profiles: &dyn ProfileRepository,
    sessions: &dyn SessionRepository,
    session_id: Uuid,
) -> Result<Profile, SessionError> {
    let session = sessions
        .find_by_id(session_id)
        .await?
        .ok_or(SessionError::UnknownSession(session_id))?;

    profiles
        .find_by_id(session.user_id)
        .await?
        .map(Profile::stripped)
        .ok_or(SessionError::UnknownSession(session_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryProfileRepository, InMemorySessionRepository};
    use crate::service::profile::create_profile;
    use sift_core::dto::profile::CreateProfile;

    async fn setup() -> (InMemoryProfileRepository, InMemorySessionRepository, Profile) {
        let profiles = InMemoryProfileRepository::new();
        let sessions = InMemorySessionRepository::new();
        let profile = create_profile(
            &profiles,
            CreateProfile {
                company_name: "Planet Express".to_string(),
                password: "hunter2".to_string(),
                address: "123 Fake Street".to_string(),
            },
        )
        .await
        .unwrap();
        (profiles, sessions, profile)
    }

    fn credentials(password: &str) -> LoginRequest {
        LoginRequest {
            company_name: "Planet Express".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_replaces_previous_session() {
        let (profiles, sessions, profile) = setup().await;

        let first = login(&profiles, &sessions, credentials("hunter2")).await.unwrap();
        let second = login(&profiles, &sessions, credentials("hunter2")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(sessions.find_by_id(first.id).await.unwrap().is_none());
        assert_eq!(
            sessions.find_by_user(profile.id).await.unwrap().map(|s| s.id),
            Some(second.id)
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (profiles, sessions, _) = setup().await;
        let err = login(&profiles, &sessions, credentials("wrong")).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_company() {
        let (profiles, sessions, _) = setup().await;
        let req = LoginRequest {
            company_name: "Slurm Inc".to_string(),
            password: "hunter2".to_string(),
        };
        let err = login(&profiles, &sessions, req).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_blank_fields() {
        let (profiles, sessions, _) = setup().await;
        let err = login(&profiles, &sessions, credentials("")).await.unwrap_err();
        assert!(matches!(err, SessionError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_authenticate_and_logout() {
        let (profiles, sessions, profile) = setup().await;
        let session = login(&profiles, &sessions, credentials("hunter2")).await.unwrap();

        let found = authenticate(&profiles, &sessions, session.id).await.unwrap();
        assert_eq!(found.id, profile.id);
        assert!(found.pw_hash.is_empty());

        assert!(logout(&sessions, session.id).await.unwrap());
        assert!(!logout(&sessions, session.id).await.unwrap());
        assert!(matches!(
            authenticate(&profiles, &sessions, session.id).await,
            Err(SessionError::UnknownSession(_))
        ));
    }
}
