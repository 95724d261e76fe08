// ==========================================
// Brick Buildability - API error type
// ==========================================
// Role: turn engine / provider / storage errors into
// messages a caller can show as-is
// ==========================================

use crate::domain::types::{BuildLock, PartKey};
use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::provider::error::ProviderError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Caller errors
    // ==========================================
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    // ==========================================
    // Provider errors
    // ==========================================
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Decrement refused because completed builds reserve the parts.
    #[error("locked: {message}")]
    Locked {
        part_key: PartKey,
        blocking: Vec<BuildLock>,
        message: String,
    },

    // ==========================================
    // Storage / config / import
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("import failed: {0}")]
    ImportError(String),

    // ==========================================
    // General
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { set_id } => ApiError::NotFound(format!("set {}", set_id)),
            ProviderError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            ProviderError::Unavailable(msg) => ApiError::Unavailable(msg),
            ProviderError::Locked {
                part_key,
                blocking,
                message,
            } => ApiError::Locked {
                part_key,
                blocking,
                message,
            },
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            e @ EngineError::SessionState { .. } => ApiError::InvalidState(e.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} {}", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            e @ RepositoryError::Locked { .. } => ProviderError::from(e).into(),
            RepositoryError::Other(e) => ApiError::Other(e),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(e) => e.into(),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result alias
pub type ApiResult<T> = Result<T, ApiError>;
