//! `.docx` template package: open, fill, serialize.
//!
//! # Scope of substitution
//!
//! | Region                                      | Walked |
//! |---------------------------------------------|--------|
//! | `w:body/w:p`                                | yes    |
//! | `w:body/w:tbl/w:tr/w:tc/w:p`                | yes    |
//! | nested tables, text boxes, content controls | no     |
//! | headers, footers, footnotes                 | no     |
//!
//! Serialization is deterministic: parts are re-zipped in their original
//! order with a fixed timestamp, so the same template and record always
//! produce the same bytes.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use grantmail_core::MatchMode;

use crate::error::RenderError;
use crate::substitute::{paragraph_text, replace_in_paragraph};
use crate::tokens::{TokenMap, ALL_TOKENS};
use crate::xml::{self, Element, Node};

/// The main document part inside the package.
pub const DOCUMENT_PART: &str = "word/document.xml";

const W_DOCUMENT: &[u8] = b"w:document";
const W_BODY: &[u8] = b"w:body";
const W_P: &[u8] = b"w:p";
const W_TBL: &[u8] = b"w:tbl";
const W_TR: &[u8] = b"w:tr";
const W_TC: &[u8] = b"w:tc";

/// Where a walked paragraph lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Body,
    TableCell,
}

#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// A parsed template. Clone it to get an independent copy per record.
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    parts: Vec<Part>,
    document: Vec<Node>,
}

impl DocxTemplate {
    /// Read and parse the template at `path`.
    pub fn open(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path).map_err(|e| RenderError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse a template from the bytes of a `.docx` package.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
                is_dir: file.is_dir(),
            });
        }

        let document_part = parts
            .iter()
            .find(|p| p.name == DOCUMENT_PART)
            .ok_or_else(|| RenderError::MissingPart {
                name: DOCUMENT_PART.to_string(),
            })?;
        let document = xml::parse(&document_part.data)?;

        let template = Self { parts, document };
        if template.body().is_none() {
            return Err(RenderError::MissingBody);
        }
        Ok(template)
    }

    /// Serialize the (possibly filled) template as a `.docx` package.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RenderError> {
        let document = xml::write(&self.document)?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for part in &self.parts {
            if part.is_dir {
                zip.add_directory(part.name.as_str(), options)?;
                continue;
            }
            zip.start_file(part.name.as_str(), options)?;
            if part.name == DOCUMENT_PART {
                zip.write_all(&document)?;
            } else {
                zip.write_all(&part.data)?;
            }
        }
        Ok(zip.finish()?.into_inner())
    }

    /// Replace every token in scope with its value for one record.
    ///
    /// Tokens are applied one after another across all walked paragraphs.
    /// Returns the number of runs changed.
    pub fn substitute(&mut self, tokens: &TokenMap, mode: MatchMode) -> Result<usize, RenderError> {
        let Some(body) = self.body_mut() else {
            return Err(RenderError::MissingBody);
        };
        let mut paragraphs = scoped_paragraphs_mut(body);

        let mut changed = 0;
        for (token, value) in tokens.iter() {
            for paragraph in &mut paragraphs {
                changed += replace_in_paragraph(paragraph, token, value, mode)?;
            }
        }
        tracing::debug!("{changed} runs changed");
        Ok(changed)
    }

    /// Text of each walked paragraph, tagged with where it lives.
    pub fn paragraph_texts(&self) -> Result<Vec<(Scope, String)>, RenderError> {
        let Some(body) = self.body() else {
            return Err(RenderError::MissingBody);
        };
        scoped_paragraphs(body)
            .into_iter()
            .map(|(scope, p)| Ok((scope, paragraph_text(p)?)))
            .collect()
    }

    /// Text of paragraphs directly in the body.
    pub fn body_paragraph_texts(&self) -> Result<Vec<String>, RenderError> {
        self.texts_in(Scope::Body)
    }

    /// Text of paragraphs inside table cells.
    pub fn table_cell_texts(&self) -> Result<Vec<String>, RenderError> {
        self.texts_in(Scope::TableCell)
    }

    /// Recognized tokens still present in any walked paragraph.
    pub fn remaining_tokens(&self) -> Result<Vec<&'static str>, RenderError> {
        let texts = self.paragraph_texts()?;
        Ok(ALL_TOKENS
            .into_iter()
            .filter(|token| texts.iter().any(|(_, t)| t.contains(token)))
            .collect())
    }

    fn texts_in(&self, scope: Scope) -> Result<Vec<String>, RenderError> {
        Ok(self
            .paragraph_texts()?
            .into_iter()
            .filter(|(s, _)| *s == scope)
            .map(|(_, t)| t)
            .collect())
    }

    fn body(&self) -> Option<&Element> {
        self.document
            .iter()
            .find_map(|n| match n {
                Node::Element(e) if e.is(W_DOCUMENT) => Some(e),
                _ => None,
            })?
            .child_elements(W_BODY)
            .next()
    }

    fn body_mut(&mut self) -> Option<&mut Element> {
        self.document
            .iter_mut()
            .find_map(|n| match n {
                Node::Element(e) if e.is(W_DOCUMENT) => Some(e),
                _ => None,
            })?
            .child_elements_mut(W_BODY)
            .next()
    }
}

// ---------------------------------------------------------------------------
// Walkers
// ---------------------------------------------------------------------------

fn scoped_paragraphs(body: &Element) -> Vec<(Scope, &Element)> {
    let mut out = Vec::new();
    for node in &body.children {
        let Node::Element(el) = node else { continue };
        if el.is(W_P) {
            out.push((Scope::Body, el));
        } else if el.is(W_TBL) {
            for row in el.child_elements(W_TR) {
                for cell in row.child_elements(W_TC) {
                    for p in cell.child_elements(W_P) {
                        out.push((Scope::TableCell, p));
                    }
                }
            }
        }
    }
    out
}

fn scoped_paragraphs_mut(body: &mut Element) -> Vec<&mut Element> {
    let mut out = Vec::new();
    for node in body.children.iter_mut() {
        let Node::Element(el) = node else { continue };
        if el.is(W_P) {
            out.push(el);
        } else if el.is(W_TBL) {
            for row in el.child_elements_mut(W_TR) {
                for cell in row.child_elements_mut(W_TC) {
                    out.extend(cell.child_elements_mut(W_P));
                }
            }
        }
    }
    out
}
