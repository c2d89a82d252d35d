pub mod config;
pub mod generate;
pub mod records;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use grantmail_core::{config as merge_config, MergeConfig};

/// Where the tracking sheet comes from. Shared by `generate` and `records`.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Config file to start from (default: ~/.grantmail/config.yaml if present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tracking spreadsheet (.xlsx, .xls, .ods) or .csv export.
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Worksheet holding the reviewer rows.
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,
}

impl SourceArgs {
    /// Effective config: file values first, then any flags given here.
    pub fn load(&self) -> Result<MergeConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(sheet) = &self.sheet {
            config.sheet = sheet.clone();
        }
        Ok(config)
    }
}

fn load_config(path: Option<&Path>) -> Result<MergeConfig> {
    match path {
        Some(path) => merge_config::load_from(path)
            .with_context(|| format!("failed to load config '{}'", path.display())),
        None => merge_config::load().context("failed to load ~/.grantmail/config.yaml"),
    }
}
