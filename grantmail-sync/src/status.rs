//! User-facing status lines.
//!
//! Status lines are the merge's report to the person running it and are kept
//! apart from `tracing` output.

use std::fmt;

use grantmail_source::SourceError;

use crate::error::MergeError;
use crate::writer::WriteResult;

/// What kind of failure a status line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SourceNotFound,
    MissingColumn,
    TemplateNotSelected,
    OutputUnwritable,
    Other,
}

impl FailureKind {
    pub fn of(err: &MergeError) -> Self {
        match err {
            MergeError::Source(SourceError::SourceNotFound { .. }) => FailureKind::SourceNotFound,
            MergeError::Source(SourceError::MissingColumn { .. }) => FailureKind::MissingColumn,
            MergeError::TemplateNotSelected { .. } => FailureKind::TemplateNotSelected,
            MergeError::OutputUnwritable { .. } => FailureKind::OutputUnwritable,
            _ => FailureKind::Other,
        }
    }
}

/// One line of batch progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    /// A record's email was produced (or already up to date).
    Generated { name: String, result: WriteResult },
    /// The batch, or one record in it, failed.
    Failed {
        kind: FailureKind,
        name: Option<String>,
        message: String,
    },
}

impl StatusLine {
    pub fn failed(err: &MergeError, name: Option<&str>) -> Self {
        StatusLine::Failed {
            kind: FailureKind::of(err),
            name: name.map(str::to_string),
            message: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusLine::Failed { .. })
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Generated { name, result } => match result {
                WriteResult::Written { .. } => write!(f, "{name}: file generated"),
                WriteResult::Unchanged { .. } => write!(f, "{name}: file unchanged"),
                WriteResult::WouldWrite { .. } => write!(f, "{name}: file would be generated"),
            },
            StatusLine::Failed {
                name: Some(name),
                message,
                ..
            } => write!(f, "ERROR: {name}: {message}"),
            StatusLine::Failed { message, .. } => write!(f, "ERROR: {message}"),
        }
    }
}

/// Receiver of status lines, in the order they happen.
pub trait StatusSink {
    fn emit(&mut self, line: StatusLine);
}

/// Collects lines in memory.
impl StatusSink for Vec<StatusLine> {
    fn emit(&mut self, line: StatusLine) {
        self.push(line);
    }
}
