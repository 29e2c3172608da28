// Shared test helpers for integration tests
#![allow(dead_code)]

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use step_report::models::now_millis;

/// Wall-clock window around `body`: (before, output, after), in epoch milliseconds.
pub fn bracket<R>(body: impl FnOnce() -> R) -> (f64, R, f64) {
    let before = now_millis();
    let output = body();
    let after = now_millis();
    (before, output, after)
}

/// Decodes a rendered document for string assertions.
pub fn xml_string(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("rendered XML must be valid UTF-8")
}

/// Whether every needle occurs in `haystack`, each after the previous one.
pub fn contains_in_order(haystack: &str, needles: &[&str]) -> bool {
    let mut rest = haystack;
    for needle in needles {
        match rest.find(needle) {
            Some(position) => rest = &rest[position + needle.len()..],
            None => return false,
        }
    }
    true
}

/// Parses `xml` with `quick_xml::Reader`: one root, matching end tags, resolvable
/// references in text and attributes, and no raw control characters.
pub fn is_well_formed(xml: &str) -> bool {
    if xml
        .chars()
        .any(|c| (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r'))
    {
        return false;
    }

    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut roots = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
                if !attributes_resolve(&start) {
                    return false;
                }
            }
            Ok(Event::Empty(start)) => {
                if depth == 0 {
                    roots += 1;
                }
                if !attributes_resolve(&start) {
                    return false;
                }
            }
            Ok(Event::End(_)) => match depth.checked_sub(1) {
                Some(remaining) => depth = remaining,
                None => return false,
            },
            Ok(Event::Text(text)) => {
                if text.unescape().is_err() {
                    return false;
                }
            }
            Ok(Event::Eof) => return depth == 0 && roots == 1,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
}

fn attributes_resolve(start: &BytesStart<'_>) -> bool {
    start
        .attributes()
        .all(|attribute| attribute.is_ok_and(|attribute| attribute.unescape_value().is_ok()))
}
