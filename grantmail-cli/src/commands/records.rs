//! `grantmail records`: show what `generate` would work from.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use grantmail_core::types::{Record, TemplateChoice};
use grantmail_sync::output_path;

use super::SourceArgs;

/// Arguments for `grantmail records`.
#[derive(Args, Debug)]
pub struct RecordsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RecordJson<'a> {
    #[serde(flatten)]
    record: &'a Record,
    template: TemplateChoice,
    output_file: String,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "row")]
    row: usize,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "grant")]
    grant: String,
    #[tabled(rename = "nda")]
    nda: &'static str,
    #[tabled(rename = "evaluation returned")]
    evaluation: String,
    #[tabled(rename = "template")]
    template: String,
}

impl RecordsArgs {
    pub fn run(self) -> Result<()> {
        let config = self.source.load()?;
        let records = grantmail_source::load_records(&config.source, &config.sheet, &config.columns)
            .with_context(|| format!("failed to load '{}'", config.source.display()))?;

        if self.json {
            let payload: Vec<RecordJson> = records
                .iter()
                .map(|record| RecordJson {
                    record,
                    template: record.template_choice(),
                    output_file: file_name(&record.name.0),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize records JSON")?
            );
            return Ok(());
        }

        println!(
            "{} | sheet '{}' | {} rows",
            config.source.display(),
            config.sheet,
            records.len()
        );
        if records.is_empty() {
            println!("No reviewer rows found.");
            return Ok(());
        }

        let pending = records
            .iter()
            .filter(|r| r.evaluation_returned.as_returned().is_none())
            .count();
        let rows: Vec<RecordRow> = records
            .into_iter()
            .map(|r| RecordRow {
                row: r.row,
                nda: if r.nda_required { "yes" } else { "no" },
                evaluation: r.evaluation_returned.to_string(),
                template: r.template_choice().to_string(),
                name: r.name.0,
                grant: r.grant,
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");

        if pending > 0 {
            println!(
                "{}",
                format!("{pending} evaluations pending; emails will say [RETURN DATE HERE]")
                    .yellow()
            );
        }
        Ok(())
    }
}

fn file_name(name: &str) -> String {
    output_path(std::path::Path::new(""), name)
        .to_string_lossy()
        .into_owned()
}
