//! Error types for grantmail-source.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading reviewer records.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source path is empty, missing, or not a regular file.
    #[error("source spreadsheet not found: '{}'", path.display())]
    SourceNotFound { path: PathBuf },

    /// Filesystem error while opening a source file.
    #[error("source io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workbook exists but could not be parsed.
    #[error("failed to read workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// The delimited file exists but could not be parsed.
    #[error("failed to read csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The requested sheet is not present in the workbook.
    #[error("sheet '{sheet}' not found (available: {})", available.join(", "))]
    SheetNotFound { sheet: String, available: Vec<String> },

    /// A required header is absent from the header row.
    #[error("required column '{column}' is missing from the source")]
    MissingColumn { column: String },

    /// The selected columns do not line up row for row.
    #[error("column '{column}' has {found} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Convenience constructor for [`SourceError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SourceError {
    SourceError::Io {
        path: path.into(),
        source,
    }
}
