//! grantmail core library: domain types, merge configuration, errors.
//!
//! - [`types`]: records, newtypes and the template selection rule
//! - [`config`]: [`MergeConfig`] and its YAML file
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{ColumnNames, MatchMode, MergeConfig, TemplatePaths, WriteFailurePolicy};
pub use error::ConfigError;
pub use types::{EvalReturned, ParticipantName, Record, TemplateChoice, NDA_MARKER};
