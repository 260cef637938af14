//! Core HTML parsing primitives
//!
//! This module contains the fundamental building blocks for HTML parsing:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Attributes: quote-aware attribute scanning into spans
//! - Tokenizer: ScanHandler-based tokenizer for tree building
//! - Entities: HTML character reference decoding with Cow (zero-copy when possible)

pub mod attributes;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
