//! Domain types for the reviewer mail merge.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! A [`Record`] is built once by the row loader and never mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Marker value in the NDA column that selects the with-NDA template.
/// Compared exactly (case-sensitive).
pub const NDA_MARKER: &str = "x";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed participant (reviewer) name. Never empty once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantName(pub String);

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ParticipantName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ParticipantName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Whether the reviewer has returned their evaluation forms.
///
/// `Pending` is the normalized form of a missing cell; it is decided once at
/// load time so substitution never has to inspect sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", tag = "status", content = "value")]
pub enum EvalReturned {
    Returned(String),
    #[default]
    Pending,
}

impl EvalReturned {
    /// The returned value, or `None` while pending.
    pub fn as_returned(&self) -> Option<&str> {
        match self {
            EvalReturned::Returned(s) => Some(s),
            EvalReturned::Pending => None,
        }
    }
}

impl fmt::Display for EvalReturned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalReturned::Returned(s) => s.fmt(f),
            EvalReturned::Pending => write!(f, "pending"),
        }
    }
}

/// Which of the two configured templates a record is merged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateChoice {
    WithNda,
    WithoutNda,
}

impl fmt::Display for TemplateChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateChoice::WithNda => write!(f, "with-nda"),
            TemplateChoice::WithoutNda => write!(f, "without-nda"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One reviewer entry merged from the tracking sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 1-based sheet row (the header is row 1).
    pub row: usize,
    pub name: ParticipantName,
    pub grant: String,
    pub nda_required: bool,
    pub evaluation_returned: EvalReturned,
}

impl Record {
    /// Template selection rule: the NDA marker picks the with-NDA template,
    /// anything else the without-NDA one.
    pub fn template_choice(&self) -> TemplateChoice {
        if self.nda_required {
            TemplateChoice::WithNda
        } else {
            TemplateChoice::WithoutNda
        }
    }
}

/// Derive the NDA flag from a raw marker cell.
pub fn is_nda_marker(raw: &str) -> bool {
    raw == NDA_MARKER
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
