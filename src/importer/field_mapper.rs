// ==========================================
// Brick Buildability - inventory field mapper
// ==========================================
// Role: raw CSV row -> InventoryLine + type conversion
// Column names follow the Rebrickable export with aliases.
// ==========================================

use crate::domain::lines::InventoryLine;
use crate::domain::types::PartKey;
use crate::importer::csv_parser::RawRow;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;

pub const FIELD_PART_NUM: &str = "part_num";
pub const FIELD_COLOR_ID: &str = "color_id";
pub const FIELD_QUANTITY: &str = "quantity";
pub const FIELD_IS_SPARE: &str = "is_spare";

/// A mapped row.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub row_number: usize,
    pub line: InventoryLine,
    pub is_spare: bool,
}

pub struct FieldMapper;

impl FieldMapper {
    /// Columns that must be present in the header.
    pub fn check_headers(&self, headers: &[String]) -> ImportResult<()> {
        for field in [FIELD_PART_NUM, FIELD_COLOR_ID, FIELD_QUANTITY] {
            let found = Self::aliases(field)
                .iter()
                .any(|alias| headers.iter().any(|h| h.eq_ignore_ascii_case(alias)));
            if !found {
                return Err(ImportError::MissingColumn(field.to_string()));
            }
        }
        Ok(())
    }

    pub fn map_row(&self, row: &RawRow) -> ImportResult<MappedRow> {
        let fields = &row.fields;
        let row_number = row.row_number;

        let part_num = self
            .get_string(fields, FIELD_PART_NUM)
            .ok_or(ImportError::PrimaryKeyMissing(row_number))?;
        let color_id = self
            .parse_i64(fields, FIELD_COLOR_ID, row_number)?
            .ok_or_else(|| ImportError::TypeConversionError {
                row: row_number,
                field: FIELD_COLOR_ID.to_string(),
                message: "value is empty".to_string(),
            })?;
        // an empty quantity cell counts as one part
        let quantity = self
            .parse_i64(fields, FIELD_QUANTITY, row_number)?
            .unwrap_or(1);
        if quantity < 0 {
            return Err(ImportError::ValueRangeError {
                row: row_number,
                field: FIELD_QUANTITY.to_string(),
                value: quantity,
            });
        }
        let is_spare = self
            .parse_bool(fields, FIELD_IS_SPARE, row_number)?
            .unwrap_or(false);

        Ok(MappedRow {
            row_number,
            line: InventoryLine {
                part_key: PartKey::new(part_num, color_id),
                have: quantity,
            },
            is_spare,
        })
    }

    fn aliases(key: &str) -> &'static [&'static str] {
        match key {
            FIELD_PART_NUM => &["part_num", "Part", "part_number", "partNum", "Part Num"],
            FIELD_COLOR_ID => &["color_id", "Color", "colour_id", "colorId"],
            FIELD_QUANTITY => &["quantity", "Quantity", "qty"],
            FIELD_IS_SPARE => &["is_spare", "Is Spare", "spare"],
            _ => &[],
        }
    }

    /// Non-empty trimmed value of the first alias present (case-insensitive).
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        for alias in Self::aliases(key) {
            let value = row
                .get(*alias)
                .or_else(|| {
                    row.iter()
                        .find(|(h, _)| h.eq_ignore_ascii_case(alias))
                        .map(|(_, v)| v)
                })
                .map(|v| v.trim());
            if let Some(v) = value {
                if !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
        None
    }

    fn parse_i64(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<i64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("not an integer: {}", value),
                }),
        }
    }

    fn parse_bool(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<bool>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" => Ok(Some(true)),
                "false" | "f" | "no" | "n" | "0" => Ok(Some(false)),
                _ => Err(ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("not a boolean: {}", value),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRow {
        RawRow {
            row_number: 7,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_map_rebrickable_headers() {
        let row = raw(&[("Part", " 3001 "), ("Color", "4"), ("Quantity", "12"), ("Is Spare", "f")]);
        let mapped = FieldMapper.map_row(&row).unwrap();

        assert_eq!(mapped.line, InventoryLine::new("3001", 4, 12));
        assert!(!mapped.is_spare);
        assert_eq!(mapped.row_number, 7);
    }

    #[test]
    fn test_missing_part_num_reports_row() {
        let row = raw(&[("part_num", ""), ("color_id", "4"), ("quantity", "1")]);
        let err = FieldMapper.map_row(&row).unwrap_err();
        assert!(matches!(err, ImportError::PrimaryKeyMissing(7)));
        assert_eq!(err.row(), Some(7));
    }

    #[test]
    fn test_bad_numbers() {
        let row = raw(&[("part_num", "3001"), ("color_id", "red"), ("quantity", "1")]);
        assert!(matches!(
            FieldMapper.map_row(&row),
            Err(ImportError::TypeConversionError { row: 7, .. })
        ));

        let row = raw(&[("part_num", "3001"), ("color_id", "4"), ("quantity", "-2")]);
        assert!(matches!(
            FieldMapper.map_row(&row),
            Err(ImportError::ValueRangeError { value: -2, .. })
        ));
    }

    #[test]
    fn test_check_headers() {
        let ok = vec!["Part".to_string(), "COLOR".to_string(), "qty".to_string()];
        assert!(FieldMapper.check_headers(&ok).is_ok());

        let missing = vec!["part_num".to_string(), "quantity".to_string()];
        assert!(matches!(
            FieldMapper.check_headers(&missing),
            Err(ImportError::MissingColumn(c)) if c == "color_id"
        ));
    }
}
