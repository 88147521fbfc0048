//! XHTML-style parsing and serialization.
//!
//! Markup is read with `quick-xml`, so it must be close to well-formed:
//! entities other than the XML ones are rejected. Void elements such as
//! `<input>` may be left unclosed.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;
use thiserror::Error;

use crate::document::{Document, NodeId};
use crate::element::{Element, NodeKind};

#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unexpected end tag </{tag}>")]
    UnexpectedEnd { tag: String },

    #[error("document contains no elements")]
    NoElements,
}

const VOID_TAGS: &[&str] = &["area", "br", "col", "hr", "img", "input", "link", "meta", "wbr"];

fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

impl Document {
    /// Parse markup into a new document.
    pub fn parse_html(src: &str) -> Result<Self, HtmlError> {
        let mut doc = Document::new();
        let root = doc.root();
        let added = doc.append_html(root, src)?;
        if !added.iter().any(|n| doc.is_element(*n)) {
            return Err(HtmlError::NoElements);
        }
        Ok(doc)
    }

    /// Parse markup and append the resulting top-level nodes to `parent`.
    pub fn append_html(&mut self, parent: NodeId, src: &str) -> Result<Vec<NodeId>, HtmlError> {
        let mut reader = Reader::from_str(src);
        reader.trim_text(true);
        reader.check_end_names(false);

        let mut top_level = Vec::new();
        // (node, tag) of currently open elements
        let mut stack: Vec<(NodeId, String)> = Vec::new();

        loop {
            let event = reader.read_event()?;
            let current_parent = stack.last().map_or(parent, |(node, _)| *node);

            match event {
                XmlEvent::Start(start) => {
                    let element = element_from_start(&start)?;
                    let tag = element.tag.clone();
                    let node = self.create_element_with(element);
                    self.append_child(current_parent, node);
                    if stack.is_empty() {
                        top_level.push(node);
                    }
                    if !is_void(&tag) {
                        stack.push((node, tag));
                    }
                }
                XmlEvent::Empty(start) => {
                    let element = element_from_start(&start)?;
                    let node = self.create_element_with(element);
                    self.append_child(current_parent, node);
                    if stack.is_empty() {
                        top_level.push(node);
                    }
                }
                XmlEvent::End(end) => {
                    let tag = String::from_utf8_lossy(end.name().as_ref()).to_ascii_lowercase();
                    if is_void(&tag) {
                        continue;
                    }
                    let Some(pos) = stack.iter().rposition(|(_, open)| *open == tag) else {
                        return Err(HtmlError::UnexpectedEnd { tag });
                    };
                    stack.truncate(pos);
                }
                XmlEvent::Text(text) => {
                    let text = text.unescape()?;
                    let node = self.create_text(text.into_owned());
                    self.append_child(current_parent, node);
                    if stack.is_empty() {
                        top_level.push(node);
                    }
                }
                XmlEvent::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    let node = self.create_text(text);
                    self.append_child(current_parent, node);
                }
                XmlEvent::Eof => break,
                // Comments, doctype, processing instructions
                _ => {}
            }
        }

        if let Some((_, tag)) = stack.last() {
            log::debug!("append_html: <{tag}> left unclosed at end of input");
        }
        Ok(top_level)
    }

    /// Serialize a node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Document) => {
                for child in self.children(id) {
                    self.write_node(*child, out);
                }
            }
            Some(NodeKind::Text(text)) => out.push_str(&escape(text.as_str())),
            Some(NodeKind::Element(el)) => {
                out.push('<');
                out.push_str(&el.tag);
                write_attributes(el, out);
                if is_void(&el.tag) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in self.children(id) {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
            None => {}
        }
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, HtmlError> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(tag);
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?;
        element.set_attribute(name, value.into_owned());
    }
    Ok(element)
}

fn write_attributes(el: &Element, out: &mut String) {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if let Some(id) = &el.id {
        pairs.push(("id", id.clone()));
    }
    if !el.classes.is_empty() {
        pairs.push(("class", el.classes.join(" ")));
    }
    pairs.extend(el.attributes.iter().map(|(k, v)| (k.as_str(), v.clone())));
    if let Some(input) = &el.input {
        pairs.push(("value", input.text.clone()));
    }

    for (name, value) in pairs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
}
