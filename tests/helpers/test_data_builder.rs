// ==========================================
// Test data builders - for integration tests
// ==========================================

use brick_buildability::db;
use brick_buildability::domain::{InventoryLine, RequirementLine};
use std::io::Write;
use tempfile::NamedTempFile;

// ==========================================
// Parts list builder
// ==========================================
pub struct SetBuilder {
    lines: Vec<RequirementLine>,
}

impl SetBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn part(mut self, part_num: &str, color_id: i64, needed: i64) -> Self {
        self.lines.push(RequirementLine::new(part_num, color_id, needed));
        self
    }

    pub fn build(self) -> Vec<RequirementLine> {
        self.lines
    }
}

// ==========================================
// Inventory builder
// ==========================================
pub struct InventoryBuilder {
    lines: Vec<InventoryLine>,
}

impl InventoryBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn owns(mut self, part_num: &str, color_id: i64, have: i64) -> Self {
        self.lines.push(InventoryLine::new(part_num, color_id, have));
        self
    }

    pub fn build(self) -> Vec<InventoryLine> {
        self.lines
    }
}

// ==========================================
// Database / files
// ==========================================

/// Temporary database with the schema applied.
///
/// # Returns
/// - NamedTempFile: keep alive for the duration of the test
/// - String: database path
pub fn create_test_db() -> (NamedTempFile, String) {
    let temp_file = NamedTempFile::new().expect("temp db file");
    let db_path = temp_file.path().to_str().unwrap().to_string();
    db::open_store(&db_path).expect("init schema");
    (temp_file, db_path)
}

/// Temporary `.csv` file with `content`.
pub fn write_csv(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("temp csv file");
    file.write_all(content.as_bytes()).expect("write csv");
    file.flush().expect("flush csv");
    file
}
