//! Text content normalization
//!
//! An element's text is the text of its descendant text nodes in document
//! order: decoded (unless raw), split on ASCII whitespace, and joined with
//! single spaces. Non-breaking spaces are not whitespace and survive.

use std::borrow::Cow;

use crate::core::entities::decode_text;
use crate::core::scanner::is_whitespace;
use crate::dom::{Document, Node, NodeId};

/// Append the normalized text of `id` to `out` (which is cleared first)
pub(crate) fn text_content(doc: &Document<'_>, id: NodeId, out: &mut String) {
    out.clear();
    let input = doc.input();

    for desc in doc.descendants(id) {
        let Some(text) = doc.node(desc).and_then(Node::as_text) else {
            continue;
        };
        let bytes = text.span.slice(input);
        let decoded = if text.needs_decode && !text.raw {
            decode_text(bytes)
        } else {
            Cow::Borrowed(bytes)
        };

        for word in decoded
            .split(|&b| is_whitespace(b))
            .filter(|word| !word.is_empty())
        {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&String::from_utf8_lossy(word));
        }
    }
}
