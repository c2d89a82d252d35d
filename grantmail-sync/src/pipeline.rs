//! Batch merge: one generated email per tracking-sheet row.
//!
//! Everything that can fail before the first record (source, template
//! selection, template parsing) is checked up front. After that, records are
//! processed strictly in sheet order, each fully written before the next.
//! Each output file belongs to the first row that resolves to it; a later
//! row with the same file fails instead of overwriting it.

use std::collections::HashMap;
use std::path::PathBuf;

use grantmail_core::{
    types::{Record, TemplateChoice},
    MergeConfig, WriteFailurePolicy,
};
use grantmail_renderer::{DocxTemplate, TokenMap};

use crate::error::MergeError;
use crate::status::{StatusLine, StatusSink};
use crate::writer::{output_path, write_document, WriteResult};

/// A record whose email was produced.
#[derive(Debug)]
pub struct RecordOutcome {
    pub record: Record,
    pub result: WriteResult,
}

/// A record skipped under [`WriteFailurePolicy::Continue`].
#[derive(Debug)]
pub struct RecordFailure {
    pub record: Record,
    pub error: MergeError,
}

/// What a batch managed to do before it finished or stopped.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<RecordOutcome>,
    pub failed: Vec<RecordFailure>,
    /// The error that ended the batch early, if any.
    pub error: Option<MergeError>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.failed.is_empty()
    }
}

/// Both templates, parsed once per batch.
#[derive(Debug)]
struct Templates {
    without_nda: DocxTemplate,
    with_nda: DocxTemplate,
}

impl Templates {
    fn open(config: &MergeConfig) -> Result<Self, MergeError> {
        if let Some(choice) = config.templates.first_unset() {
            return Err(MergeError::TemplateNotSelected { choice });
        }
        let open = |choice: TemplateChoice| {
            let path = config.templates.path_for(choice);
            DocxTemplate::open(path).map_err(|source| MergeError::TemplateUnreadable {
                path: path.to_path_buf(),
                source,
            })
        };
        Ok(Self {
            without_nda: open(TemplateChoice::WithoutNda)?,
            with_nda: open(TemplateChoice::WithNda)?,
        })
    }

    fn for_record(&self, record: &Record) -> &DocxTemplate {
        match record.template_choice() {
            TemplateChoice::WithNda => &self.with_nda,
            TemplateChoice::WithoutNda => &self.without_nda,
        }
    }
}

/// Fill one template copy for `record` and write it.
fn generate_one(
    record: &Record,
    templates: &Templates,
    config: &MergeConfig,
    dry_run: bool,
) -> Result<WriteResult, MergeError> {
    let mut doc = templates.for_record(record).clone();
    let tokens = TokenMap::for_record(record, &config.operations_manager);
    doc.substitute(&tokens, config.match_mode)?;

    let leftover = doc.remaining_tokens()?;
    if !leftover.is_empty() {
        tracing::warn!(
            "{}: tokens left unreplaced (split across formatting runs?): {}",
            record.name,
            leftover.join(", ")
        );
    }

    let bytes = doc.to_bytes()?;
    write_document(&config.output_dir, &record.name.0, &bytes, dry_run)
}

/// Reserve the output file for `record`, or fail if it cannot have one.
fn claim_output(
    record: &Record,
    config: &MergeConfig,
    claimed: &mut HashMap<PathBuf, usize>,
) -> Result<(), MergeError> {
    if record.name.0.trim().is_empty() {
        return Err(MergeError::MissingName { row: record.row });
    }
    let path = output_path(&config.output_dir, &record.name.0);
    if let Some(&first_row) = claimed.get(&path) {
        return Err(MergeError::OutputCollision { path, first_row });
    }
    claimed.insert(path, record.row);
    Ok(())
}

/// Run the whole merge described by `config`.
///
/// Every outcome is reported to `sink` as it happens; the returned report
/// carries the same information in structured form.
pub fn run(config: &MergeConfig, dry_run: bool, sink: &mut dyn StatusSink) -> BatchReport {
    let mut report = BatchReport::default();

    let prepared = grantmail_source::load_records(&config.source, &config.sheet, &config.columns)
        .map_err(MergeError::from)
        .and_then(|records| Ok((records, Templates::open(config)?)));
    let (records, templates) = match prepared {
        Ok(p) => p,
        Err(e) => {
            sink.emit(StatusLine::failed(&e, None));
            report.error = Some(e);
            return report;
        }
    };

    tracing::info!("generating {} emails", records.len());
    let mut claimed = HashMap::new();
    for record in records {
        let outcome = claim_output(&record, config, &mut claimed)
            .and_then(|()| generate_one(&record, &templates, config, dry_run));
        match outcome {
            Ok(result) => {
                sink.emit(StatusLine::Generated {
                    name: record.name.0.clone(),
                    result: result.clone(),
                });
                report.completed.push(RecordOutcome { record, result });
            }
            Err(error) => {
                let name = Some(record.name.0.as_str()).filter(|n| !n.trim().is_empty());
                sink.emit(StatusLine::failed(&error, name));
                match config.on_write_error {
                    WriteFailurePolicy::Halt => {
                        report.error = Some(error);
                        break;
                    }
                    WriteFailurePolicy::Continue => {
                        tracing::warn!("row {} ({}) failed, continuing", record.row, record.name);
                        report.failed.push(RecordFailure { record, error });
                    }
                }
            }
        }
    }
    report
}
