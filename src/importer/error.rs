// ==========================================
// Brick Buildability - import error type
// ==========================================
// Tool: thiserror derive
// Row numbers are 1-based file lines (the header is line 1).
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Import error type
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== file =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (only .csv)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    #[error("required column missing: {0}")]
    MissingColumn(String),

    // ===== row mapping =====
    #[error("type conversion failed (row {row}, field {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("part number missing (row {0})")]
    PrimaryKeyMissing(usize),

    #[error("value out of range (row {row}, field {field}): {value}")]
    ValueRangeError { row: usize, field: String, value: i64 },

    // ===== storage =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// Row the error refers to, for row-level errors.
    pub fn row(&self) -> Option<usize> {
        match self {
            ImportError::TypeConversionError { row, .. }
            | ImportError::ValueRangeError { row, .. }
            | ImportError::PrimaryKeyMissing(row) => Some(*row),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result alias
pub type ImportResult<T> = Result<T, ImportError>;
