//! `grantmail generate`: merge every reviewer row into its template.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use grantmail_core::{MatchMode, WriteFailurePolicy};
use grantmail_sync::{pipeline, StatusLine, StatusSink, WriteResult};

use super::SourceArgs;

/// Arguments for `grantmail generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Template for reviewers who do not need an NDA.
    #[arg(long, value_name = "PATH")]
    pub without_nda: Option<PathBuf>,

    /// Template for reviewers marked `x` in the NDA column.
    #[arg(long, value_name = "PATH")]
    pub with_nda: Option<PathBuf>,

    /// Folder the generated emails are written to. Must already exist.
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Name filled into ${OPERATIONS_MANAGER}.
    #[arg(long, value_name = "NAME")]
    pub operations_manager: Option<String>,

    /// Also replace tokens split across formatting runs (flattens their formatting).
    #[arg(long)]
    pub reflow: bool,

    /// Keep going after a row fails to write instead of stopping.
    #[arg(long)]
    pub keep_going: bool,

    /// Show what would be written without writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    pub fn run(self) -> Result<()> {
        let mut config = self.source.load()?;
        if let Some(path) = self.without_nda {
            config.templates.without_nda = path;
        }
        if let Some(path) = self.with_nda {
            config.templates.with_nda = path;
        }
        if let Some(dir) = self.output {
            config.output_dir = dir;
        }
        if let Some(name) = self.operations_manager {
            config.operations_manager = name;
        }
        if self.reflow {
            config.match_mode = MatchMode::Reflow;
        }
        if self.keep_going {
            config.on_write_error = WriteFailurePolicy::Continue;
        }

        tracing::debug!(?config, "effective config");

        let mut console = Console::default();
        let report = pipeline::run(&config, self.dry_run, &mut console);

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        if !report.completed.is_empty() {
            println!(
                "{prefix}{} generated, {} unchanged",
                console.written, console.unchanged
            );
        }

        if let Some(err) = report.error {
            return Err(anyhow::Error::new(err).context("generation stopped"));
        }
        if !report.failed.is_empty() {
            bail!(
                "{} of {} rows failed",
                report.failed.len(),
                report.failed.len() + report.completed.len()
            );
        }
        Ok(())
    }
}

/// Prints status lines to stdout as they arrive.
#[derive(Debug, Default)]
struct Console {
    written: usize,
    unchanged: usize,
}

impl StatusSink for Console {
    fn emit(&mut self, line: StatusLine) {
        let text = line.to_string();
        match &line {
            StatusLine::Generated {
                result: WriteResult::Unchanged { .. },
                ..
            } => {
                self.unchanged += 1;
                println!("{}", text.bright_black());
            }
            StatusLine::Generated { .. } => {
                self.written += 1;
                println!("{}", text.green());
            }
            StatusLine::Failed { .. } => println!("{}", text.red()),
        }
    }
}
