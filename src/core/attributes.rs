//! HTML Attribute Scanning
//!
//! Scans the attribute section of a start tag into spans. Values are
//! not entity-decoded here; the store hands them out as raw bytes.

use super::scanner::{is_whitespace, Scanner};
use crate::dom::Span;

/// An attribute as it appears in the source: name span plus the value
/// span, or `None` for valueless attributes such as `<input disabled>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: Span,
    pub value: Option<Span>,
}

impl Attribute {
    /// Attribute name bytes
    #[inline]
    pub fn name<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        self.name.slice(input)
    }

    /// Attribute value bytes, if the attribute has a value
    #[inline]
    pub fn value<'a>(&self, input: &'a [u8]) -> Option<&'a [u8]> {
        self.value.map(|v| v.slice(input))
    }
}

/// How a start tag ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagEnd {
    /// `>`
    Open,
    /// `/>`
    SelfClosing,
}

/// Scan attributes until the end of the start tag.
///
/// The scanner must sit just after the tag name. On success it is left
/// just after the closing `>`. Returns `None` when the input ends inside
/// the tag, in which case the tag is dropped.
pub fn scan_attributes(scanner: &mut Scanner<'_>, attrs: &mut Vec<Attribute>) -> Option<TagEnd> {
    attrs.clear();

    loop {
        scanner.skip_whitespace();
        match scanner.peek()? {
            b'>' => {
                scanner.advance(1);
                return Some(TagEnd::Open);
            }
            b'/' => {
                scanner.advance(1);
                if scanner.peek() == Some(b'>') {
                    scanner.advance(1);
                    return Some(TagEnd::SelfClosing);
                }
            }
            _ => {
                if let Some(attr) = scan_attribute(scanner) {
                    attrs.push(attr);
                }
            }
        }
    }
}

/// Scan a single `name`, `name=value`, `name="value"` or `name='value'`
fn scan_attribute(scanner: &mut Scanner<'_>) -> Option<Attribute> {
    let name_start = scanner.position();
    // A leading '=' belongs to the name
    if scanner.peek() == Some(b'=') {
        scanner.advance(1);
    }
    while let Some(b) = scanner.peek() {
        if is_whitespace(b) || matches!(b, b'/' | b'>' | b'=') {
            break;
        }
        scanner.advance(1);
    }
    let name = Span::between(name_start, scanner.position());
    if name.is_empty() {
        scanner.advance(1);
        return None;
    }

    let after_name = scanner.position();
    scanner.skip_whitespace();
    if scanner.peek() != Some(b'=') {
        // Valueless; whatever follows is the next attribute
        scanner.set_position(after_name);
        return Some(Attribute { name, value: None });
    }
    scanner.advance(1);
    scanner.skip_whitespace();

    let value = match scanner.peek() {
        Some(quote @ (b'"' | b'\'')) => {
            scanner.advance(1);
            let value_start = scanner.position();
            match scanner.find_byte(quote) {
                Some(end) => {
                    scanner.set_position(end + 1);
                    Span::between(value_start, end)
                }
                None => {
                    // Unterminated quote swallows the rest of the input
                    let end = value_start + scanner.remaining().len();
                    scanner.set_position(end);
                    Span::between(value_start, end)
                }
            }
        }
        Some(_) => {
            let value_start = scanner.position();
            while let Some(b) = scanner.peek() {
                if is_whitespace(b) || b == b'>' {
                    break;
                }
                scanner.advance(1);
            }
            Span::between(value_start, scanner.position())
        }
        None => Span::empty_at(scanner.position() as u32),
    };

    Some(Attribute {
        name,
        value: Some(value),
    })
}
