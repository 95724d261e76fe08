// ==========================================
// Brick Buildability - configuration layer
// ==========================================
// Role: settings with defaults, overridable at runtime
// Storage: config_kv table
// ==========================================

pub mod buildability_config_trait;
pub mod config_manager;
pub mod engine_config;

pub use buildability_config_trait::{BuildabilityConfigReader, ConfigResult};
pub use config_manager::{config_keys, ConfigManager};
pub use engine_config::{EngineConfig, ReportSort};
