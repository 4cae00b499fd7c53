//! Generic XML element tree.
//!
//! Gateway responses are small documents with a single root and shallow nesting,
//! so the whole body is read into an owned tree before any field mapping happens.

use std::borrow::Cow;

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use serde::Serialize;

use crate::error::{CorvusError, Result};

/// One parsed XML element.
///
/// `text` holds the element's inline character data. Whitespace-only text
/// (indentation between child elements) is dropped; any other text is kept
/// byte-for-byte after entity unescaping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlElement {
    /// Element name as written in the document.
    pub name: String,
    /// Attributes in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    /// Inline character data.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Child elements in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Returns the first child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns the inline text of the first child named `name`, if non-empty.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|child| child.text.as_str()).filter(|text| !text.is_empty())
    }

    /// Returns the value of attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Returns true if the element has neither text nor children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.children.is_empty()
    }
}

/// Parses `input` into its root element.
///
/// # Errors
///
/// Returns [`CorvusError::Parse`] if the document is not well-formed: mismatched or
/// unclosed tags, text outside the root, no root element or more than one.
///
/// # Examples
///
/// ```
/// use corvuspay::response::xml::parse_document;
///
/// let root = parse_document(r#"<order><amount currency="EUR">10.00</amount></order>"#).unwrap();
/// assert_eq!(root.name, "order");
/// assert_eq!(root.child_text("amount"), Some("10.00"));
/// ```
pub fn parse_document(input: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| parse_error(format!("at byte {}: {e}", reader.buffer_position())))?;

        match event {
            Event::Start(start) => {
                ensure_single_root(root.as_ref(), &stack)?;
                stack.push(open_element(&start)?);
            }
            Event::Empty(start) => {
                ensure_single_root(root.as_ref(), &stack)?;
                let element = open_element(&start)?;
                attach(element, &mut stack, &mut root);
            }
            Event::End(end) => {
                let name = decode(end.name().as_ref())?.into_owned();
                let mut element = stack
                    .pop()
                    .ok_or_else(|| parse_error(format!("unexpected closing tag </{name}>")))?;
                if element.name != name {
                    return Err(parse_error(format!(
                        "expected </{}>, found </{name}>",
                        element.name
                    )));
                }
                if element.text.trim().is_empty() {
                    element.text.clear();
                }
                attach(element, &mut stack, &mut root);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| parse_error(e.to_string()))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let data = data.into_inner();
                push_text(&mut stack, &decode(&data)?)?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(parse_error(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| parse_error("document has no root element".to_owned()))
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = decode(start.name().as_ref())?.into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| parse_error(format!("in <{name}>: {e}")))?;
        let key = decode(attribute.key.as_ref())?.into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| parse_error(format!("in <{name}>: {e}")))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement { name, attributes, ..XmlElement::default() })
}

fn attach(element: XmlElement, stack: &mut [XmlElement], root: &mut Option<XmlElement>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(parse_error("text outside the root element".to_owned())),
    }
}

fn ensure_single_root(root: Option<&XmlElement>, stack: &[XmlElement]) -> Result<()> {
    match root {
        Some(existing) if stack.is_empty() => {
            Err(parse_error(format!("second root element after <{}>", existing.name)))
        }
        _ => Ok(()),
    }
}

fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|e| parse_error(format!("invalid UTF-8: {e}")))
}

fn parse_error(detail: String) -> CorvusError {
    CorvusError::Parse(detail)
}
