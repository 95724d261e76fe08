// ==========================================
// Brick Buildability - API layer
// ==========================================
// Role: caller-facing operations over engine + providers
// ==========================================

pub mod buildability_api;
pub mod error;

pub use buildability_api::{BuildabilityApi, LoadOutcome};
pub use error::{ApiError, ApiResult};
