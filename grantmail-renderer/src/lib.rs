//! # grantmail-renderer
//!
//! Fills `.docx` templates with per-record values by literal token
//! substitution.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use grantmail_core::{types::Record, MatchMode};
//! use grantmail_renderer::{DocxTemplate, TokenMap};
//!
//! fn fill(record: &Record) -> Result<Vec<u8>, grantmail_renderer::RenderError> {
//!     let mut doc = DocxTemplate::open(Path::new("email.docx"))?;
//!     doc.substitute(&TokenMap::for_record(record, "Av"), MatchMode::RunLocal)?;
//!     doc.to_bytes()
//! }
//! ```

pub mod docx;
pub mod error;
pub mod substitute;
pub mod tokens;
pub mod xml;

pub use docx::{DocxTemplate, Scope};
pub use error::RenderError;
pub use tokens::TokenMap;
