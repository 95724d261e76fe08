// ==========================================
// Mock config - for integration tests
// ==========================================

use async_trait::async_trait;
use brick_buildability::config::{BuildabilityConfigReader, ConfigResult, ReportSort};

/// In-memory settings
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub staging_floor: i64,
    pub provider_base_url: Option<String>,
    pub provider_timeout_ms: u64,
    pub report_sort: ReportSort,
}

impl MockConfig {
    pub fn default() -> Self {
        Self {
            staging_floor: 0,
            provider_base_url: None,
            provider_timeout_ms: 10_000,
            report_sort: ReportSort::RequirementOrder,
        }
    }

    pub fn with_floor(floor: i64) -> Self {
        let mut config = Self::default();
        config.staging_floor = floor;
        config
    }
}

#[async_trait]
impl BuildabilityConfigReader for MockConfig {
    async fn get_staging_floor(&self) -> ConfigResult<i64> {
        Ok(self.staging_floor)
    }

    async fn get_provider_base_url(&self) -> ConfigResult<Option<String>> {
        Ok(self.provider_base_url.clone())
    }

    async fn get_provider_timeout_ms(&self) -> ConfigResult<u64> {
        Ok(self.provider_timeout_ms)
    }

    async fn get_report_sort(&self) -> ConfigResult<ReportSort> {
        Ok(self.report_sort)
    }
}
