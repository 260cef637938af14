//! Document Builder
//!
//! Builds a [`Document`] arena from tokenizer events.
//! Implements the ScanHandler trait for use with the Tokenizer.
//!
//! Nodes are appended in pre-order, so every subtree is a contiguous index
//! range. Children lists are built from parent links once the scan is done.

use super::document::Document;
use super::node::{Element, Node, NodeId, NodeKind, Text, NO_NODE, ROOT};
use super::span::Span;
use crate::core::attributes::Attribute;
use crate::core::tokenizer::ScanHandler;
use tracing::debug;

/// Elements that never have content
const VOID_ELEMENTS: &[&[u8]] = &[
    b"area", b"base", b"br", b"col", b"embed", b"hr", b"img", b"input", b"link", b"meta",
    b"param", b"source", b"track", b"wbr",
];

/// A start tag named in `openers` closes the nearest open element named in
/// `closes`, unless an element named in `boundary` is reached first.
struct CloseRule {
    openers: &'static [&'static [u8]],
    closes: &'static [&'static [u8]],
    boundary: &'static [&'static [u8]],
}

const CLOSE_RULES: &[CloseRule] = &[
    CloseRule {
        openers: &[b"li"],
        closes: &[b"li"],
        boundary: &[b"ul", b"ol", b"menu"],
    },
    CloseRule {
        openers: &[b"dt", b"dd"],
        closes: &[b"dt", b"dd"],
        boundary: &[b"dl"],
    },
    CloseRule {
        openers: &[b"tr"],
        closes: &[b"tr", b"td", b"th"],
        boundary: &[b"table", b"thead", b"tbody", b"tfoot"],
    },
    CloseRule {
        openers: &[b"td", b"th"],
        closes: &[b"td", b"th"],
        boundary: &[b"tr", b"table"],
    },
    CloseRule {
        openers: &[b"thead", b"tbody", b"tfoot"],
        closes: &[b"thead", b"tbody", b"tfoot", b"tr", b"td", b"th"],
        boundary: &[b"table"],
    },
    CloseRule {
        openers: &[b"option"],
        closes: &[b"option"],
        boundary: &[b"select", b"datalist", b"optgroup"],
    },
    CloseRule {
        openers: &[b"optgroup"],
        closes: &[b"option", b"optgroup"],
        boundary: &[b"select"],
    },
    CloseRule {
        openers: &[
            b"address", b"article", b"aside", b"blockquote", b"details", b"dialog", b"div",
            b"dl", b"fieldset", b"figcaption", b"figure", b"footer", b"form", b"h1", b"h2",
            b"h3", b"h4", b"h5", b"h6", b"header", b"hgroup", b"hr", b"main", b"menu", b"nav",
            b"ol", b"p", b"pre", b"section", b"table", b"ul", b"li", b"dd", b"dt",
        ],
        closes: &[b"p"],
        boundary: &[
            b"table", b"td", b"th", b"caption", b"button", b"html", b"template", b"object",
        ],
    },
];

#[inline]
fn contains_ignore_case(list: &[&[u8]], name: &[u8]) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(name))
}

/// Check whether `name` is a void element
#[inline]
pub fn is_void_element(name: &[u8]) -> bool {
    contains_ignore_case(VOID_ELEMENTS, name)
}

/// Builder state for constructing a Document
pub struct DocumentBuilder<'a> {
    input: &'a [u8],
    nodes: Vec<Node>,
    attributes: Vec<Attribute>,
    /// Open elements, innermost last; `ROOT` is always at the bottom
    stack: Vec<NodeId>,
}

impl<'a> DocumentBuilder<'a> {
    /// Create a new builder for the given input
    pub fn new(input: &'a [u8]) -> Self {
        // Estimate capacity based on input size
        // Typical HTML: ~1 element per 40 bytes, ~1.5 text nodes per element
        // (indentation between tags), ~1 attribute per element
        let estimated_elements = (input.len() / 40).max(16);
        let estimated_nodes = estimated_elements + (estimated_elements * 3) / 2 + 1;

        let mut nodes = Vec::with_capacity(estimated_nodes);
        nodes.push(Node::document());

        Self {
            input,
            nodes,
            attributes: Vec::with_capacity(estimated_elements),
            stack: vec![ROOT],
        }
    }

    /// Finish building: close everything still open at end of input and
    /// link children
    pub fn finish(mut self) -> Document<'a> {
        let eof = self.input.len();
        while self.stack.len() > 1 {
            self.close_top(eof);
        }
        let total = self.nodes.len() as NodeId;
        self.nodes[ROOT as usize].subtree_end = total;

        let (children_ranges, children_data) = build_children_from_parents(&self.nodes);

        // Release over-allocated capacity from the size estimates
        self.nodes.shrink_to_fit();
        self.attributes.shrink_to_fit();

        debug!(
            nodes = self.nodes.len(),
            attributes = self.attributes.len(),
            "document built"
        );

        Document::from_parts(
            self.input,
            self.nodes,
            self.attributes,
            children_ranges,
            children_data,
        )
    }

    /// Get the current parent node index
    #[inline]
    fn current_parent(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(ROOT)
    }

    #[inline]
    fn next_id(&self) -> NodeId {
        self.nodes.len() as NodeId
    }

    /// Tag name of an open element
    fn open_name(&self, id: NodeId) -> &'a [u8] {
        let input = self.input;
        self.nodes[id as usize]
            .as_element()
            .map(|elem| elem.name.slice(input))
            .unwrap_or_default()
    }

    /// Pop the innermost open element; its content ends at `at`
    fn close_top(&mut self, at: usize) {
        let Some(id) = self.stack.pop() else {
            return;
        };
        let end = self.next_id();
        let node = &mut self.nodes[id as usize];
        node.subtree_end = end;
        if let NodeKind::Element(elem) = &mut node.kind {
            elem.inner = Span::between(elem.inner.offset as usize, at);
        }
    }

    /// Close open elements down to (and including) stack position `depth`
    fn close_to_depth(&mut self, depth: usize, at: usize) {
        while self.stack.len() > depth {
            self.close_top(at);
        }
    }

    /// Apply implicit closes for a start tag named `name` beginning at `at`.
    ///
    /// Each matching rule closes the outermost closable element below the
    /// nearest boundary, so `<tr>` inside an open cell closes the cell and
    /// its row.
    fn close_implied_by(&mut self, name: &[u8], at: usize) {
        for rule in CLOSE_RULES {
            if !contains_ignore_case(rule.openers, name) {
                continue;
            }
            let mut target = None;
            for depth in (1..self.stack.len()).rev() {
                let open = self.open_name(self.stack[depth]);
                if contains_ignore_case(rule.boundary, open) {
                    break;
                }
                if contains_ignore_case(rule.closes, open) {
                    target = Some(depth);
                }
            }
            if let Some(depth) = target {
                self.close_to_depth(depth, at);
            }
        }
    }

    fn push_text(&mut self, text: Text) {
        let id = self.next_id();
        self.nodes.push(Node {
            kind: NodeKind::Text(text),
            parent: self.current_parent(),
            subtree_end: id + 1,
        });
    }
}

impl ScanHandler for DocumentBuilder<'_> {
    fn start_element(&mut self, name: Span, attrs: &[Attribute], self_closing: bool, tag: Span) {
        let name_bytes = name.slice(self.input);
        self.close_implied_by(name_bytes, tag.offset as usize);

        let mut elem = Element {
            name,
            id: None,
            class: None,
            attr_start: self.attributes.len() as u32,
            attr_count: 0,
            inner: Span::empty_at(tag.end()),
        };

        for attr in attrs {
            let attr_name = attr.name.slice(self.input);
            if let Some(value) = attr.value {
                if elem.id.is_none() && attr_name.eq_ignore_ascii_case(b"id") {
                    elem.id = Some(value);
                    continue;
                }
                if elem.class.is_none() && attr_name.eq_ignore_ascii_case(b"class") {
                    elem.class = Some(value);
                    continue;
                }
            }
            self.attributes.push(*attr);
            elem.attr_count += 1;
        }

        let id = self.next_id();
        self.nodes.push(Node {
            kind: NodeKind::Element(elem),
            parent: self.current_parent(),
            subtree_end: id + 1,
        });

        if !self_closing && !is_void_element(name_bytes) {
            self.stack.push(id);
        }
    }

    fn end_element(&mut self, name: Span, tag: Span) {
        let name_bytes = name.slice(self.input);
        let matching = (1..self.stack.len())
            .rev()
            .find(|&depth| self.open_name(self.stack[depth]).eq_ignore_ascii_case(name_bytes));

        // Unmatched end tags are ignored
        if let Some(depth) = matching {
            self.close_to_depth(depth, tag.offset as usize);
        }
    }

    fn text(&mut self, span: Span, needs_entity_decode: bool) {
        self.push_text(Text {
            span,
            needs_decode: needs_entity_decode,
            raw: false,
        });
    }

    fn raw_text(&mut self, span: Span) {
        self.push_text(Text {
            span,
            needs_decode: false,
            raw: true,
        });
    }
}

/// Build per-node children lists from parent links
///
/// Returns `(ranges, data)`: the children of node `i` are
/// `data[ranges[i].0 .. ranges[i].0 + ranges[i].1]`, in document order.
fn build_children_from_parents(nodes: &[Node]) -> (Vec<(u32, u32)>, Vec<NodeId>) {
    let num_nodes = nodes.len();

    // Count children per node
    let mut counts = vec![0u32; num_nodes];
    for node in nodes.iter().skip(1) {
        if node.parent != NO_NODE && (node.parent as usize) < num_nodes {
            counts[node.parent as usize] += 1;
        }
    }

    // Compute offsets
    let mut ranges = Vec::with_capacity(num_nodes);
    let mut offset = 0u32;
    for &count in &counts {
        ranges.push((offset, count));
        offset += count;
    }

    // Place children; pre-order keeps them in document order
    let mut data = vec![ROOT; offset as usize];
    let mut placed = vec![0u32; num_nodes];
    for (idx, node) in nodes.iter().enumerate().skip(1) {
        if node.parent != NO_NODE && (node.parent as usize) < num_nodes {
            let parent = node.parent as usize;
            let pos = ranges[parent].0 + placed[parent];
            data[pos as usize] = idx as NodeId;
            placed[parent] += 1;
        }
    }

    (ranges, data)
}
