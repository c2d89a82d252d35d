//! Workbook sources (`.xlsx`, `.xlsm`, `.xls`, `.ods`) via calamine.

use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};

use crate::error::SourceError;
use crate::table::{Cell, SourceTable};

/// Read one named sheet into a [`SourceTable`].
///
/// The first used row of the sheet is the header row.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<SourceTable, SourceError> {
    let workbook_err = |source: calamine::Error| SourceError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;
    let available = workbook.sheet_names();
    if !available.iter().any(|s| s == sheet) {
        return Err(SourceError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook.worksheet_range(sheet).map_err(workbook_err)?;
    let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|r| r.iter().map(header_text).collect())
        .unwrap_or_default();
    let rows = rows.map(|r| r.iter().map(to_cell).collect()).collect();

    tracing::debug!("read sheet '{sheet}' from {}", path.display());
    Ok(SourceTable {
        header_row,
        headers,
        rows,
    })
}

fn header_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => data
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(data.to_string())),
        other => Cell::Text(other.to_string()),
    }
}
