//! Owned XML tree for slide parts.
//!
//! Slides are parsed into a small element tree so a record's copy of the
//! template can be edited freely and written back. Qualified names are kept
//! verbatim (`a:r`, `p:txBody`), and namespace declarations stay ordinary
//! attributes, so a parse/write cycle preserves the part's vocabulary.

use std::borrow::Cow;
use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::error::{PptxError, Result};

/// A node in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Child element
    Element(XmlElement),
    /// Unescaped character data
    Text(String),
    /// CDATA section contents
    CData(String),
    /// Comment contents
    Comment(String),
}

/// An element with its attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Qualified name, e.g. `a:rPr`
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Namespace prefix, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Qualify a local name with this element's prefix
    pub fn qualify(&self, local: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Get an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Child elements, mutable
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// First child element with the given local name, mutable
    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.local_name() == local)
    }

    /// Index in `children` of the first element with the given local name
    pub fn position(&self, local: &str) -> Option<usize> {
        self.children.iter().position(|c| match c {
            XmlNode::Element(e) => e.local_name() == local,
            _ => false,
        })
    }

    /// Insert a child element at a `children` index
    pub fn insert(&mut self, index: usize, child: XmlElement) {
        self.children.insert(index, XmlNode::Element(child));
    }

    /// Append a child element
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Drop child elements whose local name matches the predicate
    pub fn remove_elements(&mut self, mut predicate: impl FnMut(&str) -> bool) {
        self.children.retain(|c| match c {
            XmlNode::Element(e) => !predicate(e.local_name()),
            _ => true,
        });
    }

    /// Concatenated text of this element and its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![XmlNode::Text(text.into())];
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Element(e) => collect_text(e, out),
            XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
            XmlNode::Comment(_) => {}
        }
    }
}

/// A parsed XML part
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Whether the source started with an XML declaration
    pub declaration: bool,
    /// Document element
    pub root: XmlElement,
}

impl XmlDocument {
    /// Parse XML bytes into a tree
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);

        let mut buf = Vec::new();
        let mut declaration = false;
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Decl(_)) => declaration = true,
                Ok(Event::Start(ref e)) => stack.push(element_from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = element_from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| PptxError::invalid_template("unbalanced end tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(ref e)) => {
                    // Whitespace outside the document element is dropped
                    if let Some(parent) = stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|err| PptxError::invalid_template(err.to_string()))?;
                        parent.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e).into_owned();
                        parent.children.push(XmlNode::CData(text));
                    }
                }
                Ok(Event::Comment(ref e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e).into_owned();
                        parent.children.push(XmlNode::Comment(text));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PptxError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(PptxError::invalid_template("unclosed element at end of part"));
        }

        let root = root.ok_or_else(|| PptxError::invalid_template("part has no root element"))?;
        Ok(Self { declaration, root })
    }

    /// Serialize the tree back to XML bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        if self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
            writer.get_mut().write_all(b"\r\n")?;
        }
        write_element(&mut writer, &self.root)?;

        Ok(writer.into_inner().into_inner())
    }
}

fn element_from_start(e: &BytesStart) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());

    for attr in e.attributes() {
        let attr = attr.map_err(|err| PptxError::invalid_template(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| PptxError::invalid_template(err.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(PptxError::invalid_template("multiple root elements")),
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(escape_markup(value, true).into_bytes()),
        });
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) => {
                writer.write_event(Event::Text(BytesText::from_escaped(escape_markup(t, false))))?
            }
            XmlNode::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
            XmlNode::Comment(t) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;

    Ok(())
}

/// Escape markup plus the whitespace a reader would otherwise normalize.
///
/// Attribute values lose raw `\n`, `\r` and `\t` to spaces on reparse, and
/// text loses a raw `\r` to line-end handling, so those go out as character
/// references.
fn escape_markup(value: &str, attribute: bool) -> String {
    let escaped = escape(value);
    if !escaped.contains(&['\n', '\r', '\t'][..]) {
        return escaped.into_owned();
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for ch in escaped.chars() {
        match ch {
            '\r' => out.push_str("&#xD;"),
            '\n' if attribute => out.push_str("&#xA;"),
            '\t' if attribute => out.push_str("&#x9;"),
            other => out.push(other),
        }
    }
    out
}
