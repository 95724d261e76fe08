// ==========================================
// Brick Buildability - engine layer
// ==========================================
// Responsibility: coverage rules, staging, reconciliation
// Rule: the engine talks to providers only through the
// provider traits, never to a transport directly
// ==========================================

pub mod coverage;
pub mod error;
pub mod fetch_guard;
pub mod reconcile;
pub mod staging;

// Re-exports
pub use coverage::CoverageEngine;
pub use error::{EngineError, EngineResult};
pub use fetch_guard::{FetchGuard, FetchTicket};
pub use reconcile::{apply_ops, ApplyReport, OpOutcome};
pub use staging::{StagingSession, DEFAULT_STAGING_FLOOR};
