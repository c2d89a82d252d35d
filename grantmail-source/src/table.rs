//! Typed source table and the positional row → [`Record`] merge.
//!
//! Cells are typed once at the loading boundary; the missing-evaluation
//! sentinel becomes [`EvalReturned::Pending`] here and nowhere else.

use chrono::{NaiveDateTime, Timelike};

use grantmail_core::{
    types::{is_nda_marker, EvalReturned, ParticipantName, Record},
    ColumnNames,
};

use crate::error::SourceError;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One source cell, independent of the file format it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// String form of the cell.
    ///
    /// Integral numbers print without a fraction; dates print as
    /// `YYYY-MM-DD`, with ` HH:MM:SS` only when a time is present.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::DateTime(dt) => format_datetime(dt),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    let t = dt.time();
    if t.num_seconds_from_midnight() == 0 && t.nanosecond() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Strip every leading and trailing parenthesis; the tracking sheet wraps
/// some return dates as `(2024-01-01)`.
pub fn strip_parens(raw: &str) -> &str {
    raw.trim_matches(|c| c == '(' || c == ')')
}

/// Normalize an evaluation-returned cell.
pub fn normalize_eval(cell: &Cell) -> EvalReturned {
    if cell.is_empty() {
        return EvalReturned::Pending;
    }
    let text = cell.to_text();
    let stripped = strip_parens(&text);
    if stripped.is_empty() {
        EvalReturned::Pending
    } else {
        EvalReturned::Returned(stripped.to_string())
    }
}

// ---------------------------------------------------------------------------
// SourceTable
// ---------------------------------------------------------------------------

/// A header row plus data rows, as read from one sheet or csv file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    /// 1-based sheet row holding the headers.
    pub header_row: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SourceTable {
    /// Index of the first header equal to `name` (exact, case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Every cell of the named column, top to bottom.
    ///
    /// Rows too short to reach the column contribute nothing, so a ragged
    /// table shows up as a length mismatch in [`SourceTable::records`].
    pub fn column(&self, name: &str) -> Result<Vec<Cell>, SourceError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| SourceError::MissingColumn {
                column: name.to_string(),
            })?;
        Ok(self.rows.iter().filter_map(|r| r.get(idx).cloned()).collect())
    }

    /// Select the four configured columns and zip them row by row.
    ///
    /// Rows where all four cells are empty are skipped. A row with data but
    /// no name is kept with an empty name; the batch reports it per record.
    pub fn records(&self, columns: &ColumnNames) -> Result<Vec<Record>, SourceError> {
        let names = self.column(&columns.name)?;
        let grants = self.column(&columns.grant)?;
        let ndas = self.column(&columns.nda)?;
        let evals = self.column(&columns.evaluation_returned)?;

        let expected = self.rows.len();
        for (column, len) in [
            (&columns.name, names.len()),
            (&columns.grant, grants.len()),
            (&columns.nda, ndas.len()),
            (&columns.evaluation_returned, evals.len()),
        ] {
            if len != expected {
                return Err(SourceError::ColumnLengthMismatch {
                    column: column.clone(),
                    expected,
                    found: len,
                });
            }
        }

        let mut records = Vec::with_capacity(expected);
        let rows = names.iter().zip(&grants).zip(&ndas).zip(&evals);
        for (i, (((name, grant), nda), eval)) in rows.enumerate() {
            let row = self.header_row + 1 + i;
            if [name, grant, nda, eval].iter().all(|c| c.is_empty()) {
                tracing::debug!("skipping blank row {row}");
                continue;
            }

            records.push(Record {
                row,
                name: ParticipantName::from(name.to_text()),
                grant: grant.to_text(),
                nda_required: is_nda_marker(&nda.to_text()),
                evaluation_returned: normalize_eval(eval),
            });
        }
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
