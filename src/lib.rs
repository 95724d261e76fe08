// ==========================================
// Brick Buildability - core library
// ==========================================
// Stack: Rust + SQLite (local store) + REST (remote provider)
// Scope: how much of a set's parts list an inventory covers,
// and how staged edits to that inventory get applied
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain layer - value types
pub mod domain;

// Repository layer - local SQLite store
pub mod repository;

// Engine layer - coverage, staging, reconciliation
pub mod engine;

// Provider layer - BOM / inventory sources
pub mod provider;

// Import layer - inventory CSV
pub mod importer;

// Configuration layer
pub mod config;

// Database infrastructure (connection setup / schema)
pub mod db;

// Logging
pub mod logging;

// API layer
pub mod api;

// Application wiring
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::{
    BuildLock, CoverageLine, CoverageReport, InventoryLine, OpKind, PartKey, ReconciliationOp,
    RequirementLine, SessionState,
};

pub use engine::{ApplyReport, CoverageEngine, EngineError, FetchGuard, StagingSession};

pub use provider::{InventoryProvider, ProviderError, RequirementsProvider};

pub use api::{ApiError, BuildabilityApi, LoadOutcome};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "brick-buildability";
