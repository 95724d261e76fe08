// ==========================================
// Brick Buildability - domain layer
// ==========================================
// Responsibility: value types shared by every layer
// Rule: no data access, no engine logic
// ==========================================

pub mod coverage;
pub mod lines;
pub mod reconciliation;
pub mod types;

// Re-exports
pub use coverage::{CoverageLine, CoverageReport};
pub use lines::{aggregate_inventory, aggregate_requirements, InventoryLine, RequirementLine};
pub use reconciliation::ReconciliationOp;
pub use types::{BuildLock, OpKind, PartKey, SessionState};
