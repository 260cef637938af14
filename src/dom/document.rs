//! HTML Document - Arena-based DOM representation
//!
//! Efficient DOM storage with:
//! - Arena allocation for nodes, in document pre-order
//! - NodeId indices for traversal
//! - Zero-copy names, attributes and text via spans

use std::ops::Range;

use tracing::debug;

use super::builder::DocumentBuilder;
use super::node::{Node, NodeId, ROOT};
use crate::core::attributes::Attribute;
use crate::core::scanner::is_whitespace;
use crate::core::tokenizer::Tokenizer;
use crate::error::{Error, Result};

/// Leading bytes inspected when deciding whether input is binary
const SNIFF_WINDOW: usize = 1024;

/// C0 controls other than HTML whitespace, plus DEL
#[inline]
fn is_binary_byte(b: u8) -> bool {
    (b < 0x20 && !is_whitespace(b)) || b == 0x7F
}

/// An HTML document stored in arena format, borrowing its input
pub struct Document<'a> {
    /// Original input (for zero-copy access)
    input: &'a [u8],
    /// Arena of nodes; index 0 is the document root
    nodes: Vec<Node>,
    /// Arena of attributes
    attributes: Vec<Attribute>,
    /// Per node `(start, count)` into `children_data`
    children_ranges: Vec<(u32, u32)>,
    children_data: Vec<NodeId>,
}

impl<'a> Document<'a> {
    /// Parse an HTML document.
    ///
    /// Malformed markup is recovered silently. Only input that cannot be
    /// tokenized at all is rejected: empty input, input longer than
    /// `u32::MAX` bytes, or binary data (more than a quarter of the first
    /// KiB being control bytes). Stray NUL bytes in a page are kept as text.
    pub fn parse(input: &'a [u8]) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::MalformedInput("empty input".to_string()));
        }
        if u32::try_from(input.len()).is_err() {
            return Err(Error::MalformedInput(format!(
                "input of {} bytes exceeds the 4 GiB limit",
                input.len()
            )));
        }
        let window = &input[..input.len().min(SNIFF_WINDOW)];
        let control = window.iter().filter(|&&b| is_binary_byte(b)).count();
        if control * 4 > window.len() {
            return Err(Error::MalformedInput(format!(
                "binary input: {control} control bytes in the first {} bytes",
                window.len()
            )));
        }

        debug!(bytes = input.len(), "parsing document");

        let mut builder = DocumentBuilder::new(input);
        Tokenizer::new(input).scan(&mut builder);
        Ok(builder.finish())
    }

    pub(super) fn from_parts(
        input: &'a [u8],
        nodes: Vec<Node>,
        attributes: Vec<Attribute>,
        children_ranges: Vec<(u32, u32)>,
        children_data: Vec<NodeId>,
    ) -> Self {
        Document {
            input,
            nodes,
            attributes,
            children_ranges,
            children_data,
        }
    }

    /// The input this document was parsed from
    #[inline]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Number of nodes, including the document root
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a document has at least its root
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The document root
    #[inline]
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Get a node by ID
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// Direct children of a node, in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.children_ranges.get(id as usize) {
            Some(&(start, count)) => {
                let start = start as usize;
                &self.children_data[start..start + count as usize]
            }
            None => &[],
        }
    }

    /// All descendants of a node in document order, excluding the node
    /// itself. Pre-order storage makes this a plain index range.
    pub fn descendants(&self, id: NodeId) -> Range<NodeId> {
        match self.node(id) {
            Some(node) => id + 1..node.subtree_end,
            None => 0..0,
        }
    }

    /// Attributes of an element (id and class excluded)
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.node(id)
            .and_then(Node::as_element)
            .and_then(|elem| {
                let start = elem.attr_start as usize;
                self.attributes.get(start..start + elem.attr_count as usize)
            })
            .unwrap_or(&[])
    }

    /// Tag name of an element, as written in the source
    pub fn element_name(&self, id: NodeId) -> Option<&'a [u8]> {
        let input = self.input;
        self.node(id)
            .and_then(Node::as_element)
            .map(|elem| elem.name.slice(input))
    }

    /// Raw bytes of a text node (not entity-decoded)
    pub fn text(&self, id: NodeId) -> Option<&'a [u8]> {
        let input = self.input;
        self.node(id)
            .and_then(Node::as_text)
            .map(|text| text.span.slice(input))
    }
}
