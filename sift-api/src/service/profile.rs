//! Profile service
//!
//! Account management for companies: registration, partial update and
//! removal. Lookup of the logged-in profile goes through the session service.

use chrono::Utc;
use sift_core::domain::profile::Profile;
use sift_core::dto::profile::{CreateProfile, UpdateProfile};
use uuid::Uuid;

use crate::auth::password;
use crate::repository::{ProfileRepository, RepositoryError, SessionRepository};

/// Profile service error type
#[derive(Debug)]
pub enum ProfileError {
    NotFound(Uuid),
    ValidationError(String),
    Conflict(String),
    PasswordHash(String),
    Repository(RepositoryError),
}

impl From<RepositoryError> for ProfileError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => ProfileError::Conflict(msg),
            other => ProfileError::Repository(other),
        }
    }
}

impl From<argon2::password_hash::Error> for ProfileError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ProfileError::PasswordHash(err.to_string())
    }
}

/// Registers a new company
pub async fn create_profile(
    profiles: &dyn ProfileRepository,
    req: CreateProfile,
) -> Result<Profile, ProfileError> {
    let blank = req.blank_fields();
    if !blank.is_empty() {
        return Err(ProfileError::ValidationError(format!(
            "Missing required fields: {}",
            blank.join(", ")
        )));
    }

    if profiles.find_by_company(&req.company_name).await?.is_some() {
        return Err(ProfileError::Conflict(format!(
            "Company {} is already registered",
            req.company_name
        )));
    }

    let now = Utc::now();
    let profile = Profile {
        id: Uuid::new_v4(),
        company_name: req.company_name,
        address: req.address,
        pw_hash: password::hash_password(&req.password)?,
        created_at: now,
        updated_at: now,
    };

    let profile = profiles.create(profile).await?;
    tracing::info!(profile_id = %profile.id, company = %profile.company_name, "Profile created");

    Ok(profile.stripped())
}

/// Applies the present fields of `req` to the profile
pub async fn update_profile(
    profiles: &dyn ProfileRepository,
    id: Uuid,
    req: UpdateProfile,
) -> Result<Profile, ProfileError> {
    if req.is_empty() {
        return Err(ProfileError::ValidationError(
            "Nothing to update".to_string(),
        ));
    }

    let mut profile = profiles
        .find_by_id(id)
        .await?
        .ok_or(ProfileError::NotFound(id))?;

    if let Some(company_name) = req.company_name {
        profile.company_name = non_blank("company_name", company_name)?;
    }
    if let Some(address) = req.address {
        profile.address = non_blank("address", address)?;
    }
    if let Some(password) = req.password {
        let password = non_blank("password", password)?;
        profile.pw_hash = password::hash_password(&password)?;
    }
    profile.updated_at = Utc::now();

    if !profiles.update(&profile).await? {
        return Err(ProfileError::NotFound(id));
    }

    tracing::info!(profile_id = %id, "Profile updated");
    Ok(profile.stripped())
}

/// Removes a profile together with all of its sessions
pub async fn delete_profile(
    profiles: &dyn ProfileRepository,
    sessions: &dyn SessionRepository,
    id: Uuid,
) -> Result<(), ProfileError> {
    let removed = sessions.delete_by_user(id).await?;

    if !profiles.delete(id).await? {
        return Err(ProfileError::NotFound(id));
    }

    tracing::info!(profile_id = %id, sessions = removed, "Profile deleted");
    Ok(())
}

fn non_blank(field: &str, value: String) -> Result<String, ProfileError> {
    if value.trim().is_empty() {
        return Err(ProfileError::ValidationError(format!(
            "{field} must not be blank"
        )));
    }
    Ok(value)
}
