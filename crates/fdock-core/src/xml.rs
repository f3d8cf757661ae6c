//! Owned XML element tree.
//!
//! Layout factories read and write their payloads against [`XElement`]; the
//! tree is parsed from and serialized to text with `quick-xml`. Attribute
//! order is preserved so that writing the same tree twice yields identical
//! output. Unknown attributes are kept but never required, which keeps readers
//! forward compatible.

use std::borrow::Cow;
use std::io::{BufRead, Write};
use std::str::FromStr;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::CodecError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XElement>,
    text: String,
}

impl XElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Append a new child element and return it for further filling.
    pub fn add_element(&mut self, name: impl Into<String>) -> &mut XElement {
        self.children.push(XElement::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn push_element(&mut self, element: XElement) {
        self.children.push(element);
    }

    /// Set (or replace) an attribute.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_owned(), value)),
        }
        self
    }

    pub fn add_string(&mut self, name: &str, value: &str) -> &mut Self {
        self.set_attr(name, value)
    }

    pub fn add_int(&mut self, name: &str, value: i64) -> &mut Self {
        self.set_attr(name, value.to_string())
    }

    pub fn add_bool(&mut self, name: &str, value: bool) -> &mut Self {
        self.set_attr(name, value.to_string())
    }

    pub fn add_f64(&mut self, name: &str, value: f64) -> &mut Self {
        self.set_attr(name, value.to_string())
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn string_attr(&self, name: &str) -> Result<&str, CodecError> {
        self.attr(name).ok_or_else(|| CodecError::MissingAttribute {
            element: self.name.clone(),
            name: name.to_owned(),
        })
    }

    pub fn int_attr(&self, name: &str) -> Result<i64, CodecError> {
        self.parsed_attr(name)
    }

    pub fn bool_attr(&self, name: &str) -> Result<bool, CodecError> {
        self.parsed_attr(name)
    }

    pub fn f64_attr(&self, name: &str) -> Result<f64, CodecError> {
        self.parsed_attr(name)
    }

    /// Parse an attribute that may be absent.
    pub fn parsed_attr_opt<T: FromStr>(&self, name: &str) -> Result<Option<T>, CodecError> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| CodecError::InvalidAttribute {
                    element: self.name.clone(),
                    name: name.to_owned(),
                    value: raw.to_owned(),
                }),
        }
    }

    fn parsed_attr<T: FromStr>(&self, name: &str) -> Result<T, CodecError> {
        self.parsed_attr_opt(name)?
            .ok_or_else(|| CodecError::MissingAttribute {
                element: self.name.clone(),
                name: name.to_owned(),
            })
    }

    /// First child with the given name.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&XElement> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn require_element(&self, name: &str) -> Result<&XElement, CodecError> {
        self.element(name).ok_or_else(|| CodecError::MissingElement {
            parent: self.name.clone(),
            name: name.to_owned(),
        })
    }

    /// All children with the given name, in document order.
    pub fn elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XElement> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    #[must_use]
    pub fn children(&self) -> &[XElement] {
        &self.children
    }

    // ---------------------------------------------------------------------
    // Text form
    // ---------------------------------------------------------------------

    /// Parse a document and return its root element.
    pub fn parse(text: &str) -> Result<XElement, CodecError> {
        Self::read_from(text.trim_start_matches('\u{feff}').as_bytes())
    }

    /// Parse a document from a buffered reader.
    pub fn read_from<R: BufRead>(source: R) -> Result<XElement, CodecError> {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<XElement> = Vec::new();
        let mut root: Option<XElement> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(start)) => stack.push(element_from_start(&start)?),
                Ok(Event::Empty(start)) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| CodecError::xml("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(text)) => {
                    if let Some(current) = stack.last_mut() {
                        let raw = String::from_utf8_lossy(&text);
                        current.text.push_str(&unescape(&raw).map_err(CodecError::xml)?);
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Ok(Event::GeneralRef(reference)) => {
                    if let Some(current) = stack.last_mut() {
                        let raw = format!("&{};", String::from_utf8_lossy(&reference));
                        current.text.push_str(&unescape(&raw).map_err(CodecError::xml)?);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => return Err(CodecError::xml(err)),
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(CodecError::xml("unexpected end of document"));
        }
        root.ok_or_else(|| CodecError::xml("document has no root element"))
    }

    /// Write this element as a complete document (with declaration).
    pub fn write_to<W: Write>(&self, sink: W) -> Result<(), CodecError> {
        let mut writer = Writer::new_with_indent(sink, b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(CodecError::xml)?;
        self.write_element(&mut writer)
    }

    /// Serialize to a string.
    pub fn to_xml_string(&self) -> Result<String, CodecError> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        String::from_utf8(bytes).map_err(CodecError::xml)
    }

    fn write_element<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), CodecError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(CodecError::xml);
        }

        writer
            .write_event(Event::Start(start))
            .map_err(CodecError::xml)?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(CodecError::xml)?;
        }
        for child in &self.children {
            child.write_element(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(CodecError::xml)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XElement, CodecError> {
    let mut element = XElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(CodecError::xml)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw: Cow<'_, str> = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map_err(CodecError::xml)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XElement],
    root: &mut Option<XElement>,
    element: XElement,
) -> Result<(), CodecError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(CodecError::xml("document has more than one root element")),
    }
}
