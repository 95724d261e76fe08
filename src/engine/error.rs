// ==========================================
// Brick Buildability - engine error type
// ==========================================
// InvalidInput is a caller bug and is never caught inside
// the engine. Provider failures during apply are reported
// per op in ApplyReport, not here.
// ==========================================

use crate::domain::types::SessionState;
use thiserror::Error;

/// Engine error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Negative quantity, empty part number or duplicate key.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation not allowed in the session's current state.
    #[error("staging session {session_id} is {actual}, expected {expected}")]
    SessionState {
        session_id: String,
        expected: SessionState,
        actual: SessionState,
    },
}

/// Result alias
pub type EngineResult<T> = Result<T, EngineError>;
