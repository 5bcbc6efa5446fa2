//! In-memory repositories
//!
//! HashMap-backed implementations of the repository traits. Nothing is
//! persisted; router and service tests run against these.

use std::collections::HashMap;

use async_trait::async_trait;
use sift_core::domain::profile::Profile;
use sift_core::domain::session::Session;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProfileRepository, RepositoryError, RepositoryResult, SessionRepository};

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<Uuid, Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: Profile) -> RepositoryResult<Profile> {
        let mut profiles = self.profiles.write().await;

        if profiles
            .values()
            .any(|p| p.company_name == profile.company_name)
        {
            return Err(RepositoryError::Conflict(format!(
                "company_name {} already exists",
                profile.company_name
            )));
        }

        profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Profile>> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn find_by_company(&self, company_name: &str) -> RepositoryResult<Option<Profile>> {
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .find(|p| p.company_name == company_name)
            .cloned())
    }

    async fn update(&self, profile: &Profile) -> RepositoryResult<bool> {
        let mut profiles = self.profiles.write().await;

        if profiles
            .values()
            .any(|p| p.id != profile.id && p.company_name == profile.company_name)
        {
            return Err(RepositoryError::Conflict(format!(
                "company_name {} already exists",
                profile.company_name
            )));
        }

        match profiles.get_mut(&profile.id) {
            Some(stored) => {
                *stored = profile.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.profiles.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: Session) -> RepositoryResult<Session> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Session>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> RepositoryResult<Option<Session>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn delete_by_user(&self, user_id: Uuid) -> RepositoryResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(company: &str) -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            company_name: company.to_string(),
            address: "123 Fake Street".to_string(),
            pw_hash: "hash".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_company_conflicts() {
        let repo = InMemoryProfileRepository::new();
        repo.create(profile("Planet Express")).await.unwrap();

        let err = repo.create(profile("Planet Express")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_missing_profile() {
        let repo = InMemoryProfileRepository::new();
        assert!(!repo.update(&profile("Mom's Friendly Robots")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_sessions_by_user() {
        let repo = InMemorySessionRepository::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        repo.create(Session::new(user)).await.unwrap();
        repo.create(Session::new(user)).await.unwrap();
        let kept = repo.create(Session::new(other)).await.unwrap();

        assert_eq!(repo.delete_by_user(user).await.unwrap(), 2);
        assert!(repo.find_by_user(user).await.unwrap().is_none());
        assert_eq!(repo.find_by_user(other).await.unwrap(), Some(kept));
    }
}
