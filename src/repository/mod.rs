// ==========================================
// Brick Buildability - repository layer
// ==========================================
// Rule: repositories hold no business logic
// ==========================================
// Role: data access over the local SQLite store
// Constraint: every query is parameterised
// ==========================================

pub mod bom_repo;
pub mod build_repo;
pub mod error;
pub mod inventory_repo;

pub use bom_repo::BomRepository;
pub use build_repo::BuildRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use inventory_repo::InventoryRepository;
