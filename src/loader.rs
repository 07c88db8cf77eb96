//! Markup loading and serialization.
//!
//! Fragments are XHTML-style: well-formed, case-sensitive, with every
//! element closed. Whitespace-only text between elements is dropped and
//! entities are unescaped on the way in.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};

/// Parse a markup fragment into a fresh document. The fragment's top-level
/// nodes become children of the document's `body` root.
pub fn parse_markup(markup: &str) -> Result<Document> {
    let mut doc = Document::new();
    let root = doc.root();
    parse_into(&mut doc, root, markup)?;
    Ok(doc)
}

/// Read a markup file from disk into a fresh document.
pub fn load_file(path: &Path) -> Result<Document> {
    let markup = std::fs::read_to_string(path)?;
    parse_markup(&markup)
}

/// Parse a fragment and append its top-level nodes under `parent`, returning
/// their ids. Each top-level subtree is built detached and attached in one
/// step, so a watching observer sees one insertion per subtree rather than
/// one per node.
pub fn parse_into(doc: &mut Document, parent: NodeId, markup: &str) -> Result<Vec<NodeId>> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(true);
    let decoder = reader.decoder();

    let mut top = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let node = element_from(doc, decoder, &start)?;
                if let Some(&current) = stack.last() {
                    doc.append_child(current, node);
                }
                stack.push(node);
            }
            Event::Empty(start) => {
                let node = element_from(doc, decoder, &start)?;
                match stack.last() {
                    Some(&current) => doc.append_child(current, node),
                    None => {
                        doc.append_child(parent, node);
                        top.push(node);
                    }
                }
            }
            Event::End(_) => {
                if let Some(done) = stack.pop() {
                    if stack.is_empty() {
                        doc.append_child(parent, done);
                        top.push(done);
                    }
                }
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(quick_xml::Error::from)?;
                let node = doc.create_text(&value);
                match stack.last() {
                    Some(&current) => doc.append_child(current, node),
                    None => {
                        doc.append_child(parent, node);
                        top.push(node);
                    }
                }
            }
            Event::Eof => {
                if let Some(&open) = stack.last() {
                    let tag = doc.tag(open).unwrap_or("?").to_string();
                    return Err(Error::UnclosedElement(tag));
                }
                break;
            }
            _ => {}
        }
    }
    Ok(top)
}

fn element_from(
    doc: &mut Document,
    decoder: quick_xml::encoding::Decoder,
    start: &BytesStart<'_>,
) -> Result<NodeId> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let node = doc.create_element(&tag);
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(quick_xml::Error::from)?;
        doc.set_attribute(node, &key, &value);
    }
    Ok(node)
}

/// Serialize the subtree rooted at `node` back to markup. Attributes come
/// out in stable (sorted) order; text and attribute values are escaped.
pub fn to_markup(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    if let Some(text) = doc.text(node) {
        out.push_str(&quick_xml::escape::escape(text));
        return;
    }
    let Some(tag) = doc.tag(node) else {
        return;
    };
    out.push('<');
    out.push_str(tag);
    if let Some(attrs) = doc.attrs(node) {
        for (key, value) in attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&quick_xml::escape::escape(value.as_str()));
            out.push('"');
        }
    }
    let children = doc.children(node).to_vec();
    if children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in children {
        write_node(doc, child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}
