// ==========================================
// Brick Buildability - inventory CSV importer
// ==========================================
// Flow:
//   0. parse file -> raw rows
//   1. map rows (bad rows are collected, not fatal)
//   2. aggregate by PartKey
//   3. optionally add to the local inventory in one transaction
// ==========================================

use crate::domain::lines::{aggregate_inventory, InventoryLine};
use crate::importer::csv_parser::CsvParser;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::repository::InventoryRepository;
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Result of parsing one file.
#[derive(Debug)]
pub struct ParsedInventory {
    /// Aggregated lines in first-seen order.
    pub lines: Vec<InventoryLine>,
    /// Rows that could not be mapped.
    pub rejected: Vec<ImportError>,
    pub rows_read: usize,
    pub spares_skipped: usize,
}

/// Import counters, printable by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub lines_written: usize,
    pub rows_rejected: usize,
    pub spares_skipped: usize,
    pub rejected_messages: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryCsvImporter {
    skip_spares: bool,
}

impl InventoryCsvImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave rows flagged `is_spare` out of the import.
    pub fn skip_spares(mut self, skip: bool) -> Self {
        self.skip_spares = skip;
        self
    }

    /// Parse a CSV file. File-level problems are errors; row-level
    /// problems are collected in `rejected` with their row numbers.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> ImportResult<ParsedInventory> {
        let (headers, rows) = CsvParser.parse_file(path.as_ref())?;
        let mapper = FieldMapper;
        mapper.check_headers(&headers)?;

        let rows_read = rows.len();
        let mut mapped = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();
        let mut spares_skipped = 0;

        for row in &rows {
            match mapper.map_row(row) {
                Ok(m) if m.is_spare && self.skip_spares => spares_skipped += 1,
                Ok(m) => mapped.push(m.line),
                Err(e) => {
                    warn!(row = row.row_number, error = %e, "row rejected");
                    rejected.push(e);
                }
            }
        }

        let lines = aggregate_inventory(mapped);
        Ok(ParsedInventory {
            lines,
            rejected,
            rows_read,
            spares_skipped,
        })
    }

    /// Parse `path` and add its lines to `repo`.
    ///
    /// Valid lines are written even when some rows were rejected; the
    /// summary lists the rejected rows.
    pub fn import_into<P: AsRef<Path>>(
        &self,
        repo: &InventoryRepository,
        path: P,
    ) -> ImportResult<ImportSummary> {
        let parsed = self.parse(path)?;
        let lines_written = repo.add_all(&parsed.lines)?;

        let summary = ImportSummary {
            rows_read: parsed.rows_read,
            lines_written,
            rows_rejected: parsed.rejected.len(),
            spares_skipped: parsed.spares_skipped,
            rejected_messages: parsed.rejected.iter().map(|e| e.to_string()).collect(),
        };
        info!(
            rows_read = summary.rows_read,
            lines_written = summary.lines_written,
            rows_rejected = summary.rows_rejected,
            "inventory import finished"
        );
        Ok(summary)
    }
}
