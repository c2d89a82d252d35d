//! # grantmail-source
//!
//! Row loader: reads the reviewer tracking sheet and produces one
//! [`Record`] per data row.
//!
//! The format is chosen by extension. `.csv` files are read as a single
//! table; everything else is opened as a workbook and the named sheet is read.

pub mod delimited;
pub mod error;
pub mod table;
pub mod workbook;

use std::path::Path;

use grantmail_core::{types::Record, ColumnNames};

pub use error::SourceError;
pub use table::{Cell, SourceTable};

/// Supported source file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => SourceFormat::Csv,
            _ => SourceFormat::Workbook,
        }
    }
}

/// Read the raw table behind `source`. `sheet` is ignored for csv files.
///
/// Returns `SourceError::SourceNotFound` when `source` is not a readable file.
pub fn load_table(source: &Path, sheet: &str) -> Result<SourceTable, SourceError> {
    if !source.is_file() {
        return Err(SourceError::SourceNotFound {
            path: source.to_path_buf(),
        });
    }
    match SourceFormat::from_path(source) {
        SourceFormat::Csv => delimited::read_csv(source),
        SourceFormat::Workbook => workbook::read_sheet(source, sheet),
    }
}

/// Load every reviewer record from `source`.
pub fn load_records(
    source: &Path,
    sheet: &str,
    columns: &ColumnNames,
) -> Result<Vec<Record>, SourceError> {
    let records = load_table(source, sheet)?.records(columns)?;
    tracing::info!("loaded {} records from {}", records.len(), source.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.CSV")), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("a.xlsx")), SourceFormat::Workbook);
        assert_eq!(SourceFormat::from_path(Path::new("a")), SourceFormat::Workbook);
    }

    #[test]
    fn empty_path_is_source_not_found() {
        let err = load_table(Path::new(""), "Sheet1").unwrap_err();
        assert!(matches!(err, SourceError::SourceNotFound { .. }));
    }
}
