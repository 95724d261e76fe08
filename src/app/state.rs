// ==========================================
// Brick Buildability - application state
// ==========================================
// Role: open the store once and wire repositories,
// providers, config and the API around it
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::BuildabilityApi;
use crate::config::{BuildabilityConfigReader, ConfigManager, EngineConfig};
use crate::db;
use crate::provider::{
    CredentialProvider, InventoryProvider, LocalProvider, RequirementsProvider, RestProvider,
};

/// Environment variable that overrides the database location.
pub const DB_PATH_ENV: &str = "BRICK_BUILDABILITY_DB_PATH";

const DB_FILE_NAME: &str = "brick_buildability.db";

/// Shared application state.
pub struct AppState {
    pub db_path: String,

    pub config_manager: Arc<ConfigManager>,

    /// Local store (always available; seeding and imports go here)
    pub local: LocalProvider,

    /// Settings resolved at startup
    pub engine_config: EngineConfig,

    pub buildability_api: Arc<BuildabilityApi>,
}

impl AppState {
    /// Open the store at `db_path` and build the API.
    ///
    /// When `provider_base_url` is configured the API talks to the remote
    /// backend with `credentials`; otherwise it uses the local store.
    pub async fn new(
        db_path: String,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "initialising app state");

        let conn = db::open_store(&db_path).map_err(|e| format!("cannot open database: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("cannot create ConfigManager: {}", e))?,
        );
        let engine_config = config_manager
            .load_engine_config()
            .await
            .map_err(|e| format!("cannot read configuration: {}", e))?;

        let local = LocalProvider::from_connection(conn);

        let (requirements, inventory): (Arc<dyn RequirementsProvider>, Arc<dyn InventoryProvider>) =
            match engine_config.provider_base_url.as_deref() {
                Some(base_url) => {
                    tracing::info!(base_url, "using remote provider");
                    let remote = Arc::new(
                        RestProvider::new(
                            base_url,
                            Duration::from_millis(engine_config.provider_timeout_ms),
                            credentials,
                        )
                        .map_err(|e| format!("cannot create RestProvider: {}", e))?,
                    );
                    (
                        remote.clone() as Arc<dyn RequirementsProvider>,
                        remote as Arc<dyn InventoryProvider>,
                    )
                }
                None => {
                    let local = Arc::new(local.clone());
                    (
                        local.clone() as Arc<dyn RequirementsProvider>,
                        local as Arc<dyn InventoryProvider>,
                    )
                }
            };

        let buildability_api = Arc::new(BuildabilityApi::new(
            requirements,
            inventory,
            config_manager.clone(),
        ));

        Ok(Self {
            db_path,
            config_manager,
            local,
            engine_config,
            buildability_api,
        })
    }
}

/// Default database path.
///
/// # Returns
/// - `$BRICK_BUILDABILITY_DB_PATH` when set and non-empty
/// - otherwise `<user data dir>/brick-buildability/brick_buildability.db`
///   (`brick-buildability-dev` in debug builds)
/// - `./brick_buildability.db` when no data dir is known
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("brick-buildability-dev");
        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("brick-buildability");

        // best-effort: on failure the open below reports the real error
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_keys;
    use crate::provider::StaticCredentials;

    #[tokio::test]
    async fn test_local_wiring() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone(), Arc::new(StaticCredentials::none()))
            .await
            .unwrap();
        assert_eq!(state.engine_config, EngineConfig::default());

        state
            .local
            .bom_repo()
            .replace_set("6020-1", None, &[crate::domain::RequirementLine::new("3001", 0, 1)])
            .unwrap();
        let report = state
            .buildability_api
            .load_report("6020-1")
            .await
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(report.total_needed, 1);
        assert_eq!(report.total_have, 0);

        state
            .config_manager
            .set_global_config_value(config_keys::STAGING_FLOOR, "1")
            .unwrap();
        let reopened = AppState::new(db_path, Arc::new(StaticCredentials::none()))
            .await
            .unwrap();
        assert_eq!(reopened.engine_config.staging_floor, 1);
    }
}
