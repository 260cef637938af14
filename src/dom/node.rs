//! HTML Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

use super::span::Span;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// The document root is always the first node in the arena
pub const ROOT: NodeId = 0;

/// Sentinel parent of the root
pub const NO_NODE: NodeId = u32::MAX;

/// A node in the document arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Type-specific data
    pub kind: NodeKind,
    /// Parent node (`NO_NODE` for the root)
    pub parent: NodeId,
    /// One past the last descendant; descendants are `id + 1 .. subtree_end`
    pub subtree_end: NodeId,
}

/// Type of HTML node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element(Element),
    /// Text content
    Text(Text),
}

/// Element data, all spans into the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written in the source
    pub name: Span,
    /// Value of the first valued `id` attribute
    pub id: Option<Span>,
    /// Value of the first valued `class` attribute
    pub class: Option<Span>,
    /// Start of this element's attributes in the attribute arena
    pub attr_start: u32,
    /// Number of attributes (id and class excluded)
    pub attr_count: u32,
    /// Bytes between the end of the start tag and the close point
    pub inner: Span,
}

impl Element {
    /// Check the tag name against `name` (ASCII case-insensitive)
    #[inline]
    pub fn is_named(&self, input: &[u8], name: &[u8]) -> bool {
        self.name.slice(input).eq_ignore_ascii_case(name)
    }

    /// Iterate over the whitespace-separated class tokens
    pub fn class_tokens<'a>(&self, input: &'a [u8]) -> impl Iterator<Item = &'a [u8]> {
        self.class
            .map(|c| c.slice(input))
            .unwrap_or_default()
            .split(|&b| crate::core::scanner::is_whitespace(b))
            .filter(|token| !token.is_empty())
    }
}

/// Text data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Text {
    /// Raw character data
    pub span: Span,
    /// Contains a `&` and may hold character references
    pub needs_decode: bool,
    /// Script/style/CDATA content, never decoded
    pub raw: bool,
}

impl Node {
    /// Create the document root
    pub fn document() -> Self {
        Node {
            kind: NodeKind::Document,
            parent: NO_NODE,
            subtree_end: ROOT + 1,
        }
    }

    /// Get element data, if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(elem) => Some(elem),
            _ => None,
        }
    }

    /// Get text data, if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&Text> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Element named by the first three input bytes
    fn element(class: Option<Span>) -> Element {
        Element {
            name: Span::between(0, 3),
            id: None,
            class,
            attr_start: 0,
            attr_count: 0,
            inner: Span::default(),
        }
    }

    #[test]
    fn test_is_named_ignores_case() {
        let input = b"DIV";
        let elem = element(None);
        assert!(elem.is_named(input, b"div"));
        assert!(!elem.is_named(input, b"dig"));
    }

    #[test]
    fn test_class_tokens() {
        let input = b"div  a\tb  c ";
        let elem = element(Some(Span::between(3, input.len())));
        let tokens: Vec<&[u8]> = elem.class_tokens(input).collect();
        assert_eq!(tokens, vec![&b"a"[..], b"b", b"c"]);

        assert_eq!(element(None).class_tokens(input).count(), 0);
    }

    #[test]
    fn test_kind_accessors() {
        let root = Node::document();
        assert!(root.as_element().is_none());
        assert!(!root.is_element());
        assert_eq!(root.parent, NO_NODE);
        assert_eq!(root.subtree_end, 1);
    }
}
