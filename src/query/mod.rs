//! Query Module
//!
//! - Builder: fluent `all`/`first`/`then` construction
//! - Program: compiled, immutable query trees with save/load
//! - Eval: document walk that fills a Store
//! - Text: text content normalization

pub mod builder;
pub mod eval;
pub mod program;
mod text;

pub use builder::{Mode, Query, QueryBuilder, QueryFactory, Save};
pub use eval::evaluate;
pub use program::{Program, QueryNode};
