//! Profile Repository
//!
//! Handles all database operations related to profiles.

use async_trait::async_trait;
use sift_core::domain::profile::Profile;
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryResult;

/// Storage for company profiles
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Inserts a new profile; fails with `Conflict` on a duplicate company name
    async fn create(&self, profile: Profile) -> RepositoryResult<Profile>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Profile>>;

    async fn find_by_company(&self, company_name: &str) -> RepositoryResult<Option<Profile>>;

    /// Overwrites the stored profile with the same ID
    ///
    /// Returns false when no such profile exists.
    async fn update(&self, profile: &Profile) -> RepositoryResult<bool>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
}

/// Postgres implementation of ProfileRepository
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn create(&self, profile: Profile) -> RepositoryResult<Profile> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, company_name, address, pw_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.company_name)
        .bind(&profile.address)
        .bind(&profile.pw_hash)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, company_name, address, pw_hash, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_company(&self, company_name: &str) -> RepositoryResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, company_name, address, pw_hash, created_at, updated_at
            FROM profiles
            WHERE company_name = $1
            "#,
        )
        .bind(company_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn update(&self, profile: &Profile) -> RepositoryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET company_name = $1, address = $2, pw_hash = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&profile.company_name)
        .bind(&profile.address)
        .bind(&profile.pw_hash)
        .bind(profile.updated_at)
        .bind(profile.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    company_name: String,
    address: String,
    pw_hash: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            company_name: row.company_name,
            address: row.address,
            pw_hash: row.pw_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
