// ==========================================
// Brick Buildability - CSV parser
// ==========================================
// Stage 0 of an import: file -> raw rows keyed by header.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One data row with its file line number.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row_number: usize,
    pub fields: HashMap<String, String>,
}

pub struct CsvParser;

impl CsvParser {
    /// Parse a `.csv` file into raw rows.
    pub fn parse_file(&self, path: &Path) -> ImportResult<(Vec<String>, Vec<RawRow>)> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        self.parse_reader(file)
    }

    /// Parse CSV text from any reader.
    ///
    /// Header names are trimmed; fully blank rows are skipped.
    pub fn parse_reader<R: Read>(&self, reader: R) -> ImportResult<(Vec<String>, Vec<RawRow>)> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);

            let fields: HashMap<String, String> = headers
                .iter()
                .cloned()
                .zip(record.iter().map(|v| v.to_string()))
                .collect();

            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow { row_number, fields });
        }

        Ok((headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reader_skips_blank_rows_and_numbers_lines() {
        let data = "part_num,color_id,quantity\n3001,4,2\n,,\n3002, 0 ,5\n";
        let (headers, rows) = CsvParser.parse_reader(data.as_bytes()).unwrap();

        assert_eq!(headers, vec!["part_num", "color_id", "quantity"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[1].row_number, 4);
        assert_eq!(rows[1].fields.get("color_id").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_missing_file() {
        let err = CsvParser
            .parse_file(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }
}
