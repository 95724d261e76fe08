// ==========================================
// Shared integration test helpers
// ==========================================
// Each test binary uses a different subset.
#![allow(dead_code)]

pub mod mock_config;
pub mod mock_providers;
pub mod test_data_builder;
