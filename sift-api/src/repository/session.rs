//! Session Repository
//!
//! Handles all database operations related to login sessions.

use async_trait::async_trait;
use sift_core::domain::session::Session;
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryResult;

/// Storage for login sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> RepositoryResult<Session>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Session>>;

    async fn find_by_user(&self, user_id: Uuid) -> RepositoryResult<Option<Session>>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;

    /// Deletes every session of a profile, returning how many were removed
    async fn delete_by_user(&self, user_id: Uuid) -> RepositoryResult<u64>;
}

/// Postgres implementation of SessionRepository
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: Session) -> RepositoryResult<Session> {
        sqlx::query("INSERT INTO sessions (id, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(session.id)
            .bind(session.user_id)
            .bind(session.created_at)
            .execute(&self.pool)
            .await?;

        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, created_at FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> RepositoryResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, created_at
            FROM sessions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}
