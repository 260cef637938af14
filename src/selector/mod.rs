//! Selector Module
//!
//! Compiles simple selector strings (`tag`, `#id`, `.class`, `*` and their
//! compound forms) into predicates over elements.
//!
//! - Parser: selector string to [`Selector`]
//! - Cache: per-thread LRU of compiled selectors

mod cache;
mod parser;

use crate::dom::Element;
use std::fmt;

/// A compiled selector: every present part must match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: Box<str>,
    tag: Option<Box<[u8]>>,
    ids: Vec<Box<[u8]>>,
    classes: Vec<Box<[u8]>>,
}

impl Selector {
    /// Compile a selector string, reusing a cached compilation when the
    /// same string was compiled recently on this thread
    pub fn compile(source: &str) -> crate::Result<Self> {
        cache::get_or_compile(source, parser::parse)
    }

    /// The selector text this was compiled from
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Test an element.
    ///
    /// Tag names compare ASCII-case-insensitively, ids compare exactly,
    /// and each class must appear among the element's class tokens.
    pub fn matches(&self, input: &[u8], elem: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !elem.is_named(input, tag) {
                return false;
            }
        }

        if !self.ids.is_empty() {
            let Some(id) = elem.id.map(|span| span.slice(input)) else {
                return false;
            };
            if self.ids.iter().any(|want| **want != *id) {
                return false;
            }
        }

        self.classes
            .iter()
            .all(|want| elem.class_tokens(input).any(|token| token == &**want))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
