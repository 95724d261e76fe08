// ==========================================
// Brick Buildability - provider layer
// ==========================================
// Responsibility: the two external data sources the engine
// consumes, and the adapters that implement them
// - http: remote REST backend
// - local: SQLite store on this machine
// ==========================================

pub mod error;
pub mod http;
pub mod local;
pub mod normalize;

use crate::domain::lines::{InventoryLine, RequirementLine};
use crate::domain::types::PartKey;
use async_trait::async_trait;

pub use error::{ProviderError, ProviderResult};
pub use http::{CredentialProvider, RestProvider, StaticCredentials};
pub use local::LocalProvider;

// ==========================================
// RequirementsProvider
// ==========================================
// Bill of materials of one set; rows already aggregated
// per PartKey.
#[async_trait]
pub trait RequirementsProvider: Send + Sync {
    /// # Errors
    /// - `NotFound`: unknown set
    /// - `Unavailable`: transport or backend failure
    async fn fetch_requirements(&self, set_id: &str) -> ProviderResult<Vec<RequirementLine>>;
}

// ==========================================
// InventoryProvider
// ==========================================
// Owned parts of the authenticated caller. Every add/decrement
// is atomic on the provider side; the engine does no locking.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    /// # Errors
    /// - `Unauthorized`: missing or invalid credentials
    /// - `Unavailable`: transport or backend failure
    async fn fetch_inventory(&self) -> ProviderResult<Vec<InventoryLine>>;

    /// Add `amount` and return the resulting quantity.
    async fn add_inventory(&self, part_key: &PartKey, amount: i64) -> ProviderResult<InventoryLine>;

    /// Remove `amount` and return the resulting quantity.
    ///
    /// May fail with `Locked` when the quantity is reserved by completed
    /// builds; the error names the blocking builds.
    async fn decrement_inventory(
        &self,
        part_key: &PartKey,
        amount: i64,
    ) -> ProviderResult<InventoryLine>;
}
