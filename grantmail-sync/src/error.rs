//! Error types for grantmail-sync.

use std::path::PathBuf;

use thiserror::Error;

use grantmail_core::types::TemplateChoice;
use grantmail_renderer::RenderError;
use grantmail_source::SourceError;

/// All errors that can end or interrupt a merge batch.
#[derive(Debug, Error)]
pub enum MergeError {
    /// One of the two template paths was never configured.
    #[error("no {choice} template selected")]
    TemplateNotSelected { choice: TemplateChoice },

    /// Loading the tracking sheet failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A configured template could not be opened or parsed.
    #[error("template {path} is unreadable: {source}")]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    /// Filling or serializing a template copy failed.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A data row has no participant name to name its document after.
    #[error("row {row} has no participant name")]
    MissingName { row: usize },

    /// An earlier row in the same batch already owns this output file.
    #[error("{path} is already generated for row {first_row}")]
    OutputCollision { path: PathBuf, first_row: usize },

    /// The output directory is unset, missing, or rejected the write.
    #[error("cannot write {path}: {reason}")]
    OutputUnwritable { path: PathBuf, reason: String },
}

/// Convenience constructor for [`MergeError::OutputUnwritable`] from an I/O failure.
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MergeError {
    MergeError::OutputUnwritable {
        path: path.into(),
        reason: source.to_string(),
    }
}
