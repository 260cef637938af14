//! DOM Module - Arena-based HTML Document
//!
//! Implements an efficient DOM representation using:
//! - Arena allocation for nodes, appended in document pre-order
//! - NodeId (u32) indices for cache-friendly traversal
//! - Spans into the input instead of copied strings

mod builder;
pub mod document;
pub mod node;
pub mod span;

pub use crate::core::attributes::Attribute;
pub use builder::is_void_element;
pub use document::Document;
pub use node::{Element, Node, NodeId, NodeKind, Text, ROOT};
pub use span::Span;
