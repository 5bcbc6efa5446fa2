//! Repository Module
//!
//! Data access layer for the API server. Handlers never touch the database
//! directly: they receive repository trait objects through
//! [`AppState`](crate::state::AppState), so storage can be swapped for the
//! in-memory implementations in tests.

pub mod memory;
pub mod profile;
pub mod session;

pub use memory::{InMemoryProfileRepository, InMemorySessionRepository};
pub use profile::{PgProfileRepository, ProfileRepository};
pub use session::{PgSessionRepository, SessionRepository};

/// Repository error type
#[derive(Debug)]
pub enum RepositoryError {
    /// A uniqueness constraint was violated
    Conflict(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(db.message().to_string())
            }
            _ => RepositoryError::DatabaseError(err),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
