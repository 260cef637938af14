//! Parsing strategies beyond the single-document `parse`
//!
//! - Parallel: batch parsing across rayon's thread pool

pub mod parallel;
