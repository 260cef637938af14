//! Selector Parser
//!
//! Parses a compound simple selector: an optional tag name or `*`,
//! followed by any number of `#id` and `.class` parts with no whitespace.

use super::Selector;
use crate::error::{Error, Result};

/// Bytes that end a name
#[inline]
fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'#' | b'.' | b'*' | b'[' | b']' | b':' | b'>' | b'+' | b'~' | b',' | b'(' | b')'
            | b'"' | b'\'' | b'\\'
    ) || crate::core::scanner::is_whitespace(b)
}

/// Why a byte cannot appear where it was found
fn unsupported(b: u8) -> &'static str {
    match b {
        b'[' | b']' => "attribute selectors are not supported",
        b':' => "pseudo-classes are not supported",
        b'>' | b'+' | b'~' | b',' => "combinators are not supported",
        b'*' => "'*' is only allowed at the start",
        b if crate::core::scanner::is_whitespace(b) => {
            "whitespace is not allowed; nest queries for descendant scoping"
        }
        _ => "unexpected character",
    }
}

struct Parser<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
}

impl<'s> Parser<'s> {
    fn error(&self, reason: impl Into<String>) -> Error {
        Error::invalid_selector(self.source, reason)
    }

    /// Read a name; must be non-empty
    fn name(&mut self, what: &str) -> Result<Box<[u8]>> {
        let start = self.pos;
        while self.pos < self.bytes.len() && !is_delimiter(self.bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(match self.bytes.get(self.pos) {
                Some(&b) if b != b'#' && b != b'.' => self.error(unsupported(b)),
                _ => self.error(format!("expected {what} name at offset {start}")),
            });
        }
        Ok(self.bytes[start..self.pos].into())
    }

    fn parse(mut self) -> Result<Selector> {
        if self.bytes.is_empty() {
            return Err(self.error("empty selector"));
        }

        let mut selector = Selector {
            source: self.source.into(),
            tag: None,
            ids: Vec::new(),
            classes: Vec::new(),
        };

        match self.bytes[0] {
            b'*' => self.pos = 1,
            b'#' | b'.' => {}
            b if is_delimiter(b) => return Err(self.error(unsupported(b))),
            _ => selector.tag = Some(self.name("tag")?),
        }

        while let Some(&b) = self.bytes.get(self.pos) {
            self.pos += 1;
            match b {
                b'#' => selector.ids.push(self.name("id")?),
                b'.' => selector.classes.push(self.name("class")?),
                other => return Err(self.error(unsupported(other))),
            }
        }

        Ok(selector)
    }
}

/// Compile a selector string without consulting the cache
pub(super) fn parse(source: &str) -> Result<Selector> {
    Parser {
        source,
        bytes: source.as_bytes(),
        pos: 0,
    }
    .parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(source: &str) -> String {
        match parse(source) {
            Err(Error::InvalidSelector { reason, .. }) => reason,
            other => panic!("expected InvalidSelector for {source:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_forms() {
        let tag = parse("div").unwrap();
        assert_eq!(tag.tag.as_deref(), Some(&b"div"[..]));
        assert!(tag.ids.is_empty() && tag.classes.is_empty());

        let id = parse("#main").unwrap();
        assert!(id.tag.is_none());
        assert_eq!(id.ids, vec![Box::from(&b"main"[..])]);

        let class = parse(".card").unwrap();
        assert_eq!(class.classes, vec![Box::from(&b"card"[..])]);

        let any = parse("*").unwrap();
        assert!(any.tag.is_none() && any.ids.is_empty() && any.classes.is_empty());
    }

    #[test]
    fn test_compound() {
        let sel = parse("div.card#main.wide").unwrap();
        assert_eq!(sel.tag.as_deref(), Some(&b"div"[..]));
        assert_eq!(sel.ids.len(), 1);
        assert_eq!(sel.classes.len(), 2);

        let star = parse("*.x").unwrap();
        assert!(star.tag.is_none());
        assert_eq!(star.classes.len(), 1);
    }

    #[test]
    fn test_names_allow_dashes_and_utf8() {
        assert!(parse("my-element").is_ok());
        assert!(parse(".café_1").is_ok());
    }

    #[test]
    fn test_rejections() {
        assert_eq!(reason(""), "empty selector");
        assert!(reason("div p").starts_with("whitespace"));
        assert!(reason(" div").starts_with("whitespace"));
        assert_eq!(reason("div>p"), "combinators are not supported");
        assert_eq!(reason("a,b"), "combinators are not supported");
        assert_eq!(reason("a[href]"), "attribute selectors are not supported");
        assert_eq!(reason("a:hover"), "pseudo-classes are not supported");
        assert_eq!(reason("div*"), "'*' is only allowed at the start");
        assert!(reason("#").starts_with("expected id name"));
        assert!(reason("div.").starts_with("expected class name"));
        assert!(reason(".a..b").starts_with("expected class name"));
    }
}
