//! Error types for grantmail-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while reading, filling, or writing a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Filesystem error while opening a template.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template is not a readable zip package.
    #[error("template package error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Reading or writing package contents in memory failed.
    #[error("template stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// `word/document.xml` is not well-formed.
    #[error("template xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Text content that is not valid UTF-8 or has a bad entity.
    #[error("template text error: {0}")]
    Text(String),

    /// A required package part is absent.
    #[error("template is missing part '{name}'")]
    MissingPart { name: String },

    /// The document part has no `w:document` / `w:body`.
    #[error("template has no document body")]
    MissingBody,
}
