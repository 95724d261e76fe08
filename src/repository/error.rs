// ==========================================
// Brick Buildability - repository error type
// ==========================================

use crate::domain::types::{BuildLock, PartKey};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Poisoned connection mutex.
    #[error("store lock poisoned: {0}")]
    LockError(String),

    #[error("store query failed: {0}")]
    DatabaseQueryError(String),

    #[error("duplicate row: {0}")]
    UniqueConstraintViolation(String),

    /// Decrement would dip into quantity reserved by completed builds.
    #[error("{part_key} is reserved by {} completed build(s)", blocking.len())]
    Locked {
        part_key: PartKey,
        blocking: Vec<BuildLock>,
    },

    #[error("invalid data: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("UNIQUE") => {
                RepositoryError::UniqueConstraintViolation(msg)
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "row".to_string(),
                id: "?".to_string(),
            },
            other => RepositoryError::DatabaseQueryError(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
