//! Span - offset and length into original input
//!
//! Zero-copy reference to a portion of the input document.
//! Used for tag names, attribute names/values, text, and inner HTML.

/// A span referencing a portion of the input document.
///
/// Size: 8 bytes. Inputs are capped at `u32::MAX` bytes by
/// [`Document::parse`](super::Document::parse), so both fields always fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Byte offset into the original input
    pub offset: u32,
    /// Length in bytes
    pub len: u32,
}

impl Span {
    /// Create a new span
    #[inline]
    pub const fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// Create a span covering `start..end` (empty if `end < start`)
    #[inline]
    pub fn between(start: usize, end: usize) -> Self {
        Self {
            offset: start as u32,
            len: end.saturating_sub(start) as u32,
        }
    }

    /// Create an empty span at `offset`
    #[inline]
    pub const fn empty_at(offset: u32) -> Self {
        Self { offset, len: 0 }
    }

    /// Check if this span is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the end offset (exclusive)
    #[inline]
    pub const fn end(&self) -> u32 {
        self.offset.saturating_add(self.len)
    }

    /// Extract the byte slice from input
    #[inline]
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        let start = self.offset as usize;
        let end = start.saturating_add(self.len as usize);
        input.get(start..end).unwrap_or(&[])
    }

    /// Extract as UTF-8 string from input
    #[inline]
    pub fn as_str<'a>(&self, input: &'a [u8]) -> Option<&'a str> {
        std::str::from_utf8(self.slice(input)).ok()
    }
}
