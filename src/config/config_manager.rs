// ==========================================
// Brick Buildability - configuration manager
// ==========================================
// Role: load, query and override settings
// Storage: config_kv table (key-value + scope)
// ==========================================

use crate::config::buildability_config_trait::{BuildabilityConfigReader, ConfigResult};
use crate::config::engine_config::{ReportSort, DEFAULT_REPORT_SORT};
use crate::db::open_sqlite_connection;
use crate::engine::staging::DEFAULT_STAGING_FLOOR;
use crate::provider::http::DEFAULT_TIMEOUT_MS;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open a ConfigManager on the database at `db_path`.
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build a ConfigManager over an existing connection.
    ///
    /// The shared PRAGMAs are applied again (idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn.lock().map_err(|e| format!("lock failed: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    /// Read a value from config_kv (scope_id='global').
    ///
    /// # Returns
    /// - Some(String): the stored value
    /// - None: key not set
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Write (or overwrite) a global value.
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        if !config_keys::ALL.contains(&key) {
            return Err(format!("unknown config key: {}", key).into());
        }
        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// Remove a global value so its default applies again.
    pub fn clear_global_config_value(&self, key: &str) -> ConfigResult<bool> {
        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
        )?;
        Ok(affected > 0)
    }

    /// All global settings as a JSON object, keys sorted.
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("lock failed: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

#[async_trait]
impl BuildabilityConfigReader for ConfigManager {
    async fn get_staging_floor(&self) -> ConfigResult<i64> {
        let value = self.get_config_or_default(
            config_keys::STAGING_FLOOR,
            &DEFAULT_STAGING_FLOOR.to_string(),
        )?;
        match value.trim().parse::<i64>() {
            Ok(v) if v >= 0 => Ok(v),
            _ => {
                tracing::warn!(value = %value, "invalid staging_floor, using default");
                Ok(DEFAULT_STAGING_FLOOR)
            }
        }
    }

    async fn get_provider_base_url(&self) -> ConfigResult<Option<String>> {
        Ok(self
            .get_global_config_value(config_keys::PROVIDER_BASE_URL)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    async fn get_provider_timeout_ms(&self) -> ConfigResult<u64> {
        let value = self.get_config_or_default(
            config_keys::PROVIDER_TIMEOUT_MS,
            &DEFAULT_TIMEOUT_MS.to_string(),
        )?;
        match value.trim().parse::<u64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                tracing::warn!(value = %value, "invalid provider_timeout_ms, using default");
                Ok(DEFAULT_TIMEOUT_MS)
            }
        }
    }

    async fn get_report_sort(&self) -> ConfigResult<ReportSort> {
        let value = self.get_config_or_default(config_keys::REPORT_SORT, DEFAULT_REPORT_SORT.as_str())?;
        Ok(value.parse::<ReportSort>().unwrap_or(DEFAULT_REPORT_SORT))
    }
}

// ==========================================
// Config key constants
// ==========================================
pub mod config_keys {
    // staging
    pub const STAGING_FLOOR: &str = "staging_floor";

    // remote provider
    pub const PROVIDER_BASE_URL: &str = "provider_base_url";
    pub const PROVIDER_TIMEOUT_MS: &str = "provider_timeout_ms";

    // report output
    pub const REPORT_SORT: &str = "report_sort";

    pub const ALL: &[&str] = &[STAGING_FLOOR, PROVIDER_BASE_URL, PROVIDER_TIMEOUT_MS, REPORT_SORT];
}
