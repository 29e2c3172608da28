//! Safe text handling for XML output.
//!
//! Content is decoded as UTF-8 with one replacement character per invalid byte, and
//! characters XML 1.0 cannot carry are replaced the same way. Markup characters are
//! escaped by `quick_xml::escape`; the replacement character is always written as the
//! reference `&#65533;`, so the output stays plain ASCII around it.

use quick_xml::escape::{escape, partial_escape};
use std::borrow::Cow;

/// The replacement character substituted for undecodable or illegal input.
pub const REPLACEMENT: char = '\u{FFFD}';

const REPLACEMENT_REF: &str = "&#65533;";

/// Decodes `bytes` as UTF-8, substituting [`REPLACEMENT`] for every byte of an invalid sequence.
pub fn decode_lossy(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }
    let mut decoded = String::with_capacity(bytes.len() + 8);
    for chunk in bytes.utf8_chunks() {
        decoded.push_str(chunk.valid());
        for _ in chunk.invalid() {
            decoded.push(REPLACEMENT);
        }
    }
    Cow::Owned(decoded)
}

/// Whether `c` may appear in an XML 1.0 document.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Escapes `text` as element content.
pub fn escape_text(text: &str) -> String {
    with_references(&partial_escape(text), false)
}

/// Escapes `text` as a double-quoted attribute value.
/// Whitespace controls are written as references so parsers do not normalise them away.
pub fn escape_attribute(text: &str) -> String {
    with_references(&escape(text), true)
}

/// Writes replaced and illegal characters (and, in attributes, whitespace controls)
/// as character references.
fn with_references(escaped: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(escaped.len());
    for c in escaped.chars() {
        match c {
            '\t' if attribute => out.push_str("&#9;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\r' if attribute => out.push_str("&#13;"),
            c if c == REPLACEMENT || !is_xml_char(c) => out.push_str(REPLACEMENT_REF),
            c => out.push(c),
        }
    }
    out
}
