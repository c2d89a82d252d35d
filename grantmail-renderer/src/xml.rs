//! Minimal owned XML tree over quick-xml events.
//!
//! Untouched nodes are written back byte-for-byte: start tags keep their raw
//! attribute text and text nodes keep their escaped form.

use std::borrow::Cow;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::RenderError;

/// One node of a parsed part.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Escaped character data, exactly as it appeared in the source.
    Text(String),
    /// Declarations, comments, processing instructions, CDATA.
    Other(Event<'static>),
}

/// An element with its children.
#[derive(Debug, Clone)]
pub struct Element {
    pub start: BytesStart<'static>,
    pub children: Vec<Node>,
    /// Written as `<x/>` while it has no children.
    pub self_closing: bool,
}

impl Element {
    /// A new, childless element written as `<name/>`.
    pub fn empty(name: &'static str) -> Self {
        Self {
            start: BytesStart::new(name),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Qualified tag name, e.g. `w:p`.
    pub fn is(&self, name: &[u8]) -> bool {
        self.start.name().as_ref() == name
    }

    /// Direct child elements named `name`.
    pub fn child_elements<'a>(&'a self, name: &'a [u8]) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |n| match n {
            Node::Element(e) if e.is(name) => Some(e),
            _ => None,
        })
    }

    /// Mutable direct child elements named `name`.
    pub fn child_elements_mut<'a>(
        &'a mut self,
        name: &'a [u8],
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.children.iter_mut().filter_map(move |n| match n {
            Node::Element(e) if e.is(name) => Some(e),
            _ => None,
        })
    }

    /// Value of attribute `key`, if present and decodable.
    pub fn attr(&self, key: &[u8]) -> Option<String> {
        self.start
            .try_get_attribute(key)
            .ok()
            .flatten()
            .and_then(|a| a.unescape_value().ok().map(Cow::into_owned))
    }

    /// Unescaped concatenation of the direct text children.
    pub fn text(&self) -> Result<String, RenderError> {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(raw) = node {
                out.push_str(&unescape(raw).map_err(|e| RenderError::Text(e.to_string()))?);
            }
        }
        Ok(out)
    }

    /// Replace all children with a single escaped text node.
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(escape(text).into_owned())];
        self.self_closing = false;
    }
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

/// Parse a complete XML part into its top-level nodes.
pub fn parse(xml: &[u8]) -> Result<Vec<Node>, RenderError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        let node = match event {
            Event::Start(e) => {
                stack.push(Element {
                    start: e.into_owned(),
                    children: Vec::new(),
                    self_closing: false,
                });
                buf.clear();
                continue;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| RenderError::Text("unbalanced end tag".to_string()))?;
                Node::Element(element)
            }
            Event::Empty(e) => Node::Element(Element {
                start: e.into_owned(),
                children: Vec::new(),
                self_closing: true,
            }),
            Event::Text(t) => {
                let raw = String::from_utf8(t.into_inner().into_owned())
                    .map_err(|e| RenderError::Text(e.to_string()))?;
                Node::Text(raw)
            }
            Event::Eof => break,
            other => Node::Other(other.into_owned()),
        };

        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(RenderError::Text("unclosed element at end of part".to_string()));
    }
    Ok(roots)
}

// ---------------------------------------------------------------------------
// Write
// ---------------------------------------------------------------------------

/// Serialize nodes back into a part.
pub fn write(nodes: &[Node]) -> Result<Vec<u8>, RenderError> {
    let mut writer = Writer::new(Vec::new());
    write_nodes(&mut writer, nodes)?;
    Ok(writer.into_inner())
}

fn write_nodes(writer: &mut Writer<Vec<u8>>, nodes: &[Node]) -> Result<(), RenderError> {
    for node in nodes {
        match node {
            Node::Element(el) if el.self_closing && el.children.is_empty() => {
                writer.write_event(Event::Empty(el.start.borrow()))?;
            }
            Node::Element(el) => {
                writer.write_event(Event::Start(el.start.borrow()))?;
                write_nodes(writer, &el.children)?;
                writer.write_event(Event::End(el.start.to_end()))?;
            }
            Node::Text(raw) => {
                writer.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?;
            }
            Node::Other(event) => {
                writer.write_event(event.borrow())?;
            }
        }
    }
    Ok(())
}
