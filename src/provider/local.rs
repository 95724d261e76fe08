// ==========================================
// Brick Buildability - local store provider
// ==========================================
// Implements both provider traits over the SQLite store.
// Repository failures are mapped through From<RepositoryError>.
// ==========================================

use crate::db;
use crate::domain::lines::{InventoryLine, RequirementLine};
use crate::domain::types::PartKey;
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::{InventoryProvider, RequirementsProvider};
use crate::repository::{BomRepository, BuildRepository, InventoryRepository};
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::instrument;

/// Local store adapter. Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct LocalProvider {
    bom_repo: Arc<BomRepository>,
    inventory_repo: Arc<InventoryRepository>,
    build_repo: Arc<BuildRepository>,
}

impl LocalProvider {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            bom_repo: Arc::new(BomRepository::from_connection(Arc::clone(&conn))),
            inventory_repo: Arc::new(InventoryRepository::from_connection(Arc::clone(&conn))),
            build_repo: Arc::new(BuildRepository::from_connection(conn)),
        }
    }

    /// Open (and initialise if needed) the store at `db_path`.
    pub fn open(db_path: &str) -> ProviderResult<Self> {
        let conn = db::open_store(db_path)
            .map_err(|e| ProviderError::Unavailable(format!("open {}: {}", db_path, e)))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    pub fn bom_repo(&self) -> &BomRepository {
        &self.bom_repo
    }

    pub fn inventory_repo(&self) -> &InventoryRepository {
        &self.inventory_repo
    }

    pub fn build_repo(&self) -> &BuildRepository {
        &self.build_repo
    }
}

#[async_trait]
impl RequirementsProvider for LocalProvider {
    #[instrument(skip(self))]
    async fn fetch_requirements(&self, set_id: &str) -> ProviderResult<Vec<RequirementLine>> {
        Ok(self.bom_repo.find_requirements(set_id)?)
    }
}

#[async_trait]
impl InventoryProvider for LocalProvider {
    #[instrument(skip(self))]
    async fn fetch_inventory(&self) -> ProviderResult<Vec<InventoryLine>> {
        Ok(self.inventory_repo.list_all()?)
    }

    #[instrument(skip(self, part_key), fields(part_key = %part_key))]
    async fn add_inventory(&self, part_key: &PartKey, amount: i64) -> ProviderResult<InventoryLine> {
        Ok(self.inventory_repo.add(part_key, amount)?)
    }

    #[instrument(skip(self, part_key), fields(part_key = %part_key))]
    async fn decrement_inventory(
        &self,
        part_key: &PartKey,
        amount: i64,
    ) -> ProviderResult<InventoryLine> {
        Ok(self.inventory_repo.decrement(part_key, amount)?)
    }
}
