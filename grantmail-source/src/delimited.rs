//! Comma-separated exports of the tracking sheet.

use std::fs::File;
use std::path::Path;

use crate::error::{io_err, SourceError};
use crate::table::{Cell, SourceTable};

/// Read a csv file with a header line into a [`SourceTable`].
///
/// Every non-empty field is text; empty fields are [`Cell::Empty`].
pub fn read_csv(path: &Path) -> Result<SourceTable, SourceError> {
    let csv_err = |source: csv::Error| SourceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut reader = csv::ReaderBuilder::new().from_reader(file);

    let headers = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    tracing::debug!("read {} csv rows from {}", rows.len(), path.display());
    Ok(SourceTable {
        header_row: 1,
        headers,
        rows,
    })
}
