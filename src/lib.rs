//! spanscrape - Targeted HTML queries into a flat, index-addressable store
//!
//! Pipeline:
//! 1. Tokenize and tree-build the input into an arena [`Document`]
//! 2. Evaluate compiled [`Program`]s against it
//! 3. Return a [`Store`] of matched elements, copying only the fields asked for
//!
//! ```
//! use spanscrape::{parse, Query, Save};
//!
//! let program = Query::all("div", Save::all())
//!     .all("a", Save::only_text_content())
//!     .build()?;
//!
//! let html = br#"<div>Hello <a href="https://example.com">Example</a></div>"#;
//! let store = parse(html, &[program])?;
//!
//! let div = store.get(1).unwrap();
//! assert_eq!(div.text_content(), Some("Hello Example"));
//! let link = store.get(div.child("a").unwrap()[0] as usize).unwrap();
//! assert_eq!(link.attribute("href"), Some(Some(&b"https://example.com"[..])));
//! # Ok::<(), spanscrape::Error>(())
//! ```
//!
//! # Features
//!
//! - `mimalloc`: install mimalloc as the global allocator
//! - `memory_tracking`: count allocations for [`memory::current`] and
//!   [`memory::peak`]; without it both report zero

mod core;
pub mod dom;
mod error;
pub mod memory;
pub mod query;
pub mod selector;
pub mod store;
mod strategy;

pub use dom::Document;
pub use error::{Error, Result};
pub use query::{evaluate, Mode, Program, Query, QueryBuilder, QueryFactory, QueryNode, Save};
pub use selector::Selector;
pub use store::{Record, Store};
pub use strategy::parallel::parse_many;

use tracing::{debug, debug_span};

/// Parse `input` and evaluate `programs` against it.
///
/// Fails only with [`Error::MalformedInput`] for input that cannot be
/// tokenized at all; markup errors are recovered silently.
pub fn parse(input: &[u8], programs: &[Program]) -> Result<Store> {
    let span = debug_span!("parse", bytes = input.len(), programs = programs.len());
    let _guard = span.enter();

    let doc = Document::parse(input)?;
    let store = evaluate(&doc, programs);

    debug!(nodes = doc.len(), records = store.len(), "parse complete");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_empty() {
        let program = Query::all("p", Save::none()).build().unwrap();
        assert!(matches!(
            parse(b"", &[program]),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_store_outlives_input() {
        let program = Query::all("p", Save::all()).build().unwrap();
        let store = {
            let owned = b"<p>temporary</p>".to_vec();
            parse(&owned, &[program]).unwrap()
        };
        assert_eq!(store.get(1).unwrap().inner_html(), Some(&b"temporary"[..]));
    }

    #[test]
    fn test_document_reuse_across_program_sets() {
        let doc = Document::parse(b"<a>1</a><b>2</b>").unwrap();
        let a = evaluate(&doc, &[Query::all("a", Save::none()).build().unwrap()]);
        let b = evaluate(&doc, &[Query::all("b", Save::none()).build().unwrap()]);
        assert_eq!(a.get(1).unwrap().name(), b"a");
        assert_eq!(b.get(1).unwrap().name(), b"b");
    }
}
