//! Run-scoped token replacement inside a single paragraph.
//!
//! A paragraph is only considered when a token appears in its full text, but
//! the replacement itself happens run by run. A token whose characters are
//! spread over two runs is therefore left alone unless [`MatchMode::Reflow`]
//! is selected.

use quick_xml::events::BytesStart;

use grantmail_core::MatchMode;

use crate::error::RenderError;
use crate::xml::{Element, Node};

pub(crate) const W_R: &[u8] = b"w:r";
const W_T: &[u8] = b"w:t";
const W_TAB: &[u8] = b"w:tab";
const W_BR: &[u8] = b"w:br";
const W_CR: &[u8] = b"w:cr";
const W_PTAB: &[u8] = b"w:ptab";
const W_NO_BREAK_HYPHEN: &[u8] = b"w:noBreakHyphen";

/// Run children that contribute to the run's text.
fn is_text_bearing(el: &Element) -> bool {
    if el.is(W_T) || el.is(W_TAB) || el.is(W_PTAB) || el.is(W_CR) || el.is(W_NO_BREAK_HYPHEN) {
        return true;
    }
    // Page and column breaks are layout, not text.
    el.is(W_BR) && matches!(el.attr(b"w:type").as_deref(), None | Some("textWrapping"))
}

fn has_text(run: &Element) -> bool {
    run.children
        .iter()
        .any(|n| matches!(n, Node::Element(e) if is_text_bearing(e)))
}

/// Visible text of one run. Tabs read as `\t`, line breaks as `\n`,
/// non-breaking hyphens as `-`.
pub fn run_text(run: &Element) -> Result<String, RenderError> {
    let mut out = String::new();
    for node in &run.children {
        let Node::Element(el) = node else { continue };
        if el.is(W_T) {
            out.push_str(&el.text()?);
        } else if el.is(W_TAB) || el.is(W_PTAB) {
            out.push('\t');
        } else if el.is(W_NO_BREAK_HYPHEN) {
            out.push('-');
        } else if is_text_bearing(el) {
            out.push('\n');
        }
    }
    Ok(out)
}

/// Concatenated text of the paragraph's direct runs.
pub fn paragraph_text(paragraph: &Element) -> Result<String, RenderError> {
    let mut out = String::new();
    for run in paragraph.child_elements(W_R) {
        out.push_str(&run_text(run)?);
    }
    Ok(out)
}

/// Replace the run's text content, keeping its properties and any
/// non-text children. New text goes where the first text child was.
pub fn set_run_text(run: &mut Element, text: &str) {
    let mut kept = Vec::with_capacity(run.children.len());
    let mut insert_at = None;
    for node in std::mem::take(&mut run.children) {
        if matches!(&node, Node::Element(e) if is_text_bearing(e)) {
            insert_at.get_or_insert(kept.len());
            continue;
        }
        kept.push(node);
    }
    let at = insert_at.unwrap_or(kept.len());
    kept.splice(at..at, text_nodes(text));
    run.self_closing = run.self_closing && kept.is_empty();
    run.children = kept;
}

fn text_nodes(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut segment = String::new();
    for c in text.chars() {
        match c {
            '\t' | '\n' => {
                flush_segment(&mut segment, &mut nodes);
                let name = if c == '\t' { "w:tab" } else { "w:br" };
                nodes.push(Node::Element(Element::empty(name)));
            }
            other => segment.push(other),
        }
    }
    flush_segment(&mut segment, &mut nodes);
    nodes
}

fn flush_segment(segment: &mut String, nodes: &mut Vec<Node>) {
    if segment.is_empty() {
        return;
    }
    let start = if segment.starts_with(char::is_whitespace) || segment.ends_with(char::is_whitespace) {
        BytesStart::new("w:t").with_attributes([("xml:space", "preserve")])
    } else {
        BytesStart::new("w:t")
    };
    let mut t = Element {
        start,
        children: Vec::new(),
        self_closing: true,
    };
    t.set_text(segment);
    nodes.push(Node::Element(t));
    segment.clear();
}

/// Collapse every run's text into the first text-bearing run.
fn reflow(paragraph: &mut Element) -> Result<(), RenderError> {
    let full = paragraph_text(paragraph)?;
    let mut first = true;
    for run in paragraph.child_elements_mut(W_R) {
        if !has_text(run) {
            continue;
        }
        if first {
            set_run_text(run, &full);
            first = false;
        } else {
            set_run_text(run, "");
        }
    }
    Ok(())
}

/// Replace `token` with `value` in one paragraph.
///
/// Returns the number of runs changed.
pub fn replace_in_paragraph(
    paragraph: &mut Element,
    token: &str,
    value: &str,
    mode: MatchMode,
) -> Result<usize, RenderError> {
    let in_paragraph = paragraph_text(paragraph)?.matches(token).count();
    if in_paragraph == 0 {
        return Ok(0);
    }

    // Some occurrence straddles a run boundary.
    if mode == MatchMode::Reflow {
        let mut in_runs = 0;
        for run in paragraph.child_elements(W_R) {
            in_runs += run_text(run)?.matches(token).count();
        }
        if in_runs < in_paragraph {
            reflow(paragraph)?;
        }
    }

    let mut changed = 0;
    for run in paragraph.child_elements_mut(W_R) {
        let text = run_text(run)?;
        if text.contains(token) {
            set_run_text(run, &text.replace(token, value));
            changed += 1;
        }
    }
    Ok(changed)
}
