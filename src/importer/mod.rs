// ==========================================
// Brick Buildability - import layer
// ==========================================
// Role: bring an owned-parts CSV export into the local store
// ==========================================

pub mod csv_parser;
pub mod error;
pub mod field_mapper;
pub mod inventory_importer;

pub use csv_parser::{CsvParser, RawRow};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, MappedRow};
pub use inventory_importer::{ImportSummary, InventoryCsvImporter, ParsedInventory};
