//! # XML Writer Module / XML 写入器模块
//!
//! A streaming writer on top of `quick_xml::Writer`. Elements without content
//! self-close; all text and attribute values pass through the safe text rules first.
//!
//! 基于 `quick_xml::Writer` 的流式写入器。没有内容的元素自闭合；
//! 所有文本和属性值都先经过安全文本规则处理。

use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use std::borrow::Cow;
use std::fmt;

use crate::markup::schema::Markup;
use crate::markup::text::{decode_lossy, escape_attribute, escape_text};

/// Streaming XML writer.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
    open: Vec<String>,
    /// Start tag of the innermost element, held back until it is known whether it has content.
    pending: Option<BytesStart<'static>>,
}

impl fmt::Debug for XmlWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlWriter")
            .field("open", &self.open)
            .field("written", &self.inner.get_ref().len())
            .finish_non_exhaustive()
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            inner: Writer::new(Vec::new()),
            open: Vec::new(),
            pending: None,
        }
    }

    fn emit(&mut self, event: Event<'_>) {
        // The sink is a Vec<u8>, which never reports an I/O error.
        let _ = self.inner.write_event(event);
    }

    /// Writes the XML declaration. Only meaningful before the root element.
    pub fn declaration(&mut self) {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)));
        self.emit(Event::Text(BytesText::from_escaped("\n")));
    }

    pub fn start_element(&mut self, name: &str) {
        self.flush_start_tag();
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open.push(name.to_string());
    }

    /// Adds an attribute to the element just started.
    ///
    /// Ignored once the element has content, since the start tag is already written.
    pub fn attribute(&mut self, name: &str, value: &[u8]) {
        let Some(start) = self.pending.as_mut() else {
            return;
        };
        let escaped = escape_attribute(&decode_lossy(value));
        start.push_attribute(Attribute {
            key: QName(name.as_bytes()),
            value: Cow::Owned(escaped.into_bytes()),
        });
    }

    pub fn text(&mut self, value: &[u8]) {
        self.flush_start_tag();
        let escaped = escape_text(&decode_lossy(value));
        self.emit(Event::Text(BytesText::from_escaped(escaped)));
    }

    /// Closes the innermost open element.
    pub fn end_element(&mut self) {
        let Some(name) = self.open.pop() else {
            return;
        };
        match self.pending.take() {
            Some(start) => self.emit(Event::Empty(start)),
            None => self.emit(Event::End(BytesEnd::new(name))),
        }
    }

    /// `<name>value</name>`.
    pub fn text_element(&mut self, name: &str, value: &[u8]) {
        self.start_element(name);
        if !value.is_empty() {
            self.text(value);
        }
        self.end_element();
    }

    fn flush_start_tag(&mut self) {
        if let Some(start) = self.pending.take() {
            self.emit(Event::Start(start));
        }
    }

    /// Closes every element still open and returns the document bytes.
    pub fn finish(mut self) -> Vec<u8> {
        while !self.open.is_empty() {
            self.end_element();
        }
        self.inner.into_inner()
    }
}

/// Renders `object` as a complete document, declaration included.
pub fn to_xml<M: Markup + ?Sized>(object: &M) -> Vec<u8> {
    let mut writer = XmlWriter::new();
    writer.declaration();
    object.write_markup(&mut writer);
    writer.finish()
}

/// Renders `object` without the XML declaration.
pub fn to_xml_fragment<M: Markup + ?Sized>(object: &M) -> String {
    let mut writer = XmlWriter::new();
    object.write_markup(&mut writer);
    // Every event above was built from `str` content.
    String::from_utf8_lossy(&writer.finish()).into_owned()
}
