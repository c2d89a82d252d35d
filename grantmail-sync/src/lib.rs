//! # grantmail-sync
//!
//! Batch merge orchestration and the hash-gated atomic writer.
//!
//! Call [`run`] with a [`MergeConfig`](grantmail_core::MergeConfig) to load
//! the tracking sheet, fill the matching template for every row, and write
//! `<Name> - Email.docx` files, reporting progress through a [`StatusSink`].

pub mod error;
pub mod pipeline;
pub mod status;
pub mod writer;

pub use error::MergeError;
pub use pipeline::{run, BatchReport, RecordFailure, RecordOutcome};
pub use status::{FailureKind, StatusLine, StatusSink};
pub use writer::{output_path, write_document, WriteResult};
