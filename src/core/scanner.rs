//! SIMD-accelerated HTML scanning using memchr
//!
//! Uses memchr crate for fast byte searching with SIMD acceleration:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)

use memchr::{memchr, memchr_iter, memrchr};

/// Byte cursor over the input document
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position (clamped to the input length)
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Get remaining bytes
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Skip HTML whitespace (space, tab, newline, form feed, carriage return)
    #[inline]
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if !is_whitespace(b) {
                break;
            }
            self.pos += 1;
        }
    }

    /// Find next '<' (tag start) using SIMD
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        memchr(b'<', self.remaining()).map(|i| self.pos + i)
    }

    /// Find next occurrence of a specific byte
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, self.remaining()).map(|i| self.pos + i)
    }

    /// Find the next occurrence of `needle` at or after the current position
    pub fn find_sequence(&self, needle: &[u8]) -> Option<usize> {
        let first = *needle.first()?;
        let hay = self.remaining();
        memchr_iter(first, hay)
            .find(|&i| hay[i..].starts_with(needle))
            .map(|i| self.pos + i)
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.remaining().starts_with(needle)
    }

    /// Case-insensitive (ASCII) variant of [`starts_with`](Self::starts_with)
    #[inline]
    pub fn starts_with_ignore_case(&self, needle: &[u8]) -> bool {
        let hay = self.remaining();
        hay.len() >= needle.len() && hay[..needle.len()].eq_ignore_ascii_case(needle)
    }

    /// Read a tag name: an ASCII letter followed by anything up to
    /// whitespace, '/', or '>'
    pub fn read_tag_name(&mut self) -> Option<(usize, usize)> {
        let start = self.pos;
        if !self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            return None;
        }
        self.pos += 1;
        while let Some(b) = self.peek() {
            if is_whitespace(b) || b == b'/' || b == b'>' {
                break;
            }
            self.pos += 1;
        }
        Some((start, self.pos))
    }

    /// Find where a raw text element's content ends: the start of the next
    /// `</name` (ASCII case-insensitive) followed by whitespace, '/', or '>'
    /// and closed by a later '>'. An end tag cut off by EOF is content.
    ///
    /// Only positions holding '<' are considered, and '<' never occurs
    /// inside a multi-byte UTF-8 sequence.
    pub fn find_raw_text_end(&self, name: &[u8]) -> Option<usize> {
        let hay = self.remaining();
        let last_gt = memrchr(b'>', hay)?;
        memchr_iter(b'<', &hay[..last_gt])
            .find(|&i| {
                let rest = &hay[i..];
                let after = 2 + name.len();
                after <= last_gt - i
                    && rest[1] == b'/'
                    && rest[2..after].eq_ignore_ascii_case(name)
                    && matches!(rest[after], b if is_whitespace(b) || b == b'/' || b == b'>')
            })
            .map(|i| self.pos + i)
    }
}

/// HTML whitespace: space, tab, LF, FF, CR
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0C' | b'\r')
}
