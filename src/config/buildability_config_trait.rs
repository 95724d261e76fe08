// ==========================================
// Brick Buildability - config reader trait
// ==========================================
// Role: the settings the engine and API read (no impl here)
// Rule: no writes, no business logic
// ==========================================

use crate::config::engine_config::{EngineConfig, ReportSort};
use async_trait::async_trait;
use std::error::Error;

/// Result alias for config reads
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// BuildabilityConfigReader Trait
// ==========================================
// Implementors: ConfigManager (config_kv table), test mocks
#[async_trait]
pub trait BuildabilityConfigReader: Send + Sync {
    /// Lowest quantity a staged edit may reach.
    ///
    /// # Default
    /// - 0
    async fn get_staging_floor(&self) -> ConfigResult<i64>;

    /// Base URL of the remote provider; None means the local store.
    async fn get_provider_base_url(&self) -> ConfigResult<Option<String>>;

    /// # Default
    /// - 10000
    async fn get_provider_timeout_ms(&self) -> ConfigResult<u64>;

    /// Line order used when printing a report.
    ///
    /// # Default
    /// - requirement order
    async fn get_report_sort(&self) -> ConfigResult<ReportSort>;

    /// Resolve every setting at once.
    async fn load_engine_config(&self) -> ConfigResult<EngineConfig> {
        Ok(EngineConfig {
            staging_floor: self.get_staging_floor().await?,
            provider_base_url: self.get_provider_base_url().await?,
            provider_timeout_ms: self.get_provider_timeout_ms().await?,
            report_sort: self.get_report_sort().await?,
        })
    }
}
