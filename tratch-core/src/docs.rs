//! Documentation XML scanning.
//!
//! Both the semantic model and in-source doc comments advertise exceptions
//! as `<exception cref="T:NS.Type">...</exception>` entries. Doc comments in
//! the wild are not valid XML documents: they lack a single root, carry bare
//! ampersands, and sometimes control characters, so the fragment is wrapped
//! and sanitized before parsing. An entry without a usable `cref`/`type`
//! attribute degrades to a sentinel name instead of failing the scan.

use crate::error::{TratchError, TratchResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Name recorded for an `<exception>` entry whose type attribute is absent.
pub const UNIDENTIFIED_EXCEPTION_TYPE: &str = "!XML_EXCEPTION_TYPE_NOT_IDENTIFIED!";

/// Extract the exception type names documented in a doc-comment fragment.
///
/// Accepts both `cref` (C# convention, with an optional `T:` prefix) and
/// `type` attributes. Returns an error only when the fragment cannot be
/// parsed even after sanitizing; callers treat that as "no doc evidence
/// from this node" and continue.
pub fn exception_crefs(xml: &str) -> TratchResult<Vec<String>> {
    let wrapped = format!("<comment_root>{}</comment_root>", sanitize(xml));
    let mut reader = Reader::from_str(&wrapped);
    let mut out = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"exception" {
                    let mut name: Option<String> = None;
                    for attr in e.attributes().flatten() {
                        let key = attr.key.local_name();
                        if key.as_ref() == b"cref" || key.as_ref() == b"type" {
                            if let Ok(value) = attr.unescape_value() {
                                name = Some(value.into_owned());
                            }
                        }
                    }
                    out.push(match name {
                        Some(n) => n.trim_start_matches("T:").to_owned(),
                        None => UNIDENTIFIED_EXCEPTION_TYPE.to_owned(),
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TratchError::doc(format!(
                    "documentation XML parse failed: {e}"
                )))
            }
            _ => {}
        }
    }
    Ok(out)
}

/// Drop characters XML forbids and escape ampersands that do not start an
/// entity reference.
fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, ch) in input.char_indices() {
        match ch {
            '&' => {
                if starts_entity(&input[i + 1..]) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

fn starts_entity(rest: &str) -> bool {
    match rest.find(';') {
        Some(semi) if semi > 0 && semi <= 10 => rest[..semi]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '#'),
        _ => false,
    }
}
