// ==========================================
// Brick Buildability - provider error type
// ==========================================
// Errors surfaced by the bill-of-materials and inventory
// providers. The engine passes them through untouched.
// Tool: thiserror derive
// ==========================================

use crate::domain::types::{BuildLock, PartKey};
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider error type
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProviderError {
    #[error("set not found: {set_id}")]
    NotFound { set_id: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Transport or backend failure, presumed transient.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Business-rule rejection of a decrement.
    #[error("decrement of {part_key} is locked: {message}")]
    Locked {
        part_key: PartKey,
        blocking: Vec<BuildLock>,
        message: String,
    },
}

impl ProviderError {
    pub fn is_locked(&self) -> bool {
        matches!(self, ProviderError::Locked { .. })
    }

    /// Whether a later attempt of the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_))
    }
}

// ==========================================
// From RepositoryError
// Local-store failures are reported like any other provider
// ==========================================
impl From<RepositoryError> for ProviderError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } if entity == "set" => {
                ProviderError::NotFound { set_id: id }
            }
            RepositoryError::Locked { part_key, blocking } => {
                let message = format!(
                    "{} reserved by {} completed build(s)",
                    part_key,
                    blocking.len()
                );
                ProviderError::Locked {
                    part_key,
                    blocking,
                    message,
                }
            }
            other => ProviderError::Unavailable(other.to_string()),
        }
    }
}

/// Result alias
pub type ProviderResult<T> = Result<T, ProviderError>;
