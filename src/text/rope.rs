//! Character storage using the ropey crate.
//!
//! All positions are char indices. Cloning is cheap: ropey shares its
//! chunks between clones and copies on write, so a buffer can be duplicated
//! before it is handed to an editing operation.

use ropey::{Rope, RopeSlice};
use std::ops::Range;

/// Wrapper around `ropey::Rope` with char-indexed convenience methods.
#[derive(Clone, Debug, Default)]
pub struct RopeWrapper {
    rope: Rope,
}

impl RopeWrapper {
    /// Create an empty rope.
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Create a rope from a string.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }

    /// Get the number of characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Character at `idx`, or `None` past the end.
    #[must_use]
    pub fn get_char(&self, idx: usize) -> Option<char> {
        self.rope.get_char(idx)
    }

    /// Get a slice of the rope; out-of-range bounds give an empty slice.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> RopeSlice<'_> {
        self.rope
            .get_slice(range)
            .unwrap_or_else(|| self.rope.slice(..0))
    }

    /// Iterate characters starting at `idx` (clamped to the end).
    pub fn chars_from(&self, idx: usize) -> ropey::iter::Chars<'_> {
        self.rope.chars_at(idx.min(self.len_chars()))
    }

    /// First position at or after `from` holding `ch`.
    #[must_use]
    pub fn find_forward(&self, from: usize, ch: char) -> Option<usize> {
        self.chars_from(from)
            .position(|c| c == ch)
            .map(|offset| from + offset)
    }

    /// Last position strictly before `before` holding `ch`.
    #[must_use]
    pub fn find_backward(&self, before: usize, ch: char) -> Option<usize> {
        let mut chars = self.chars_from(before);
        let mut idx = before.min(self.len_chars());
        while let Some(c) = chars.prev() {
            idx -= 1;
            if c == ch {
                return Some(idx);
            }
        }
        None
    }

    /// Replace chars `range` with the contents of `other`.
    ///
    /// The caller validates the range.
    pub fn splice(&mut self, range: Range<usize>, other: &Self) {
        let tail = self.rope.split_off(range.end);
        self.rope.remove(range.start..);
        self.rope.append(other.rope.clone());
        self.rope.append(tail);
    }

    /// Append text to the end.
    pub fn append(&mut self, text: &str) {
        let len = self.len_chars();
        self.rope.insert(len, text);
    }

    /// Copy out `range` as an independent rope.
    #[must_use]
    pub fn sub_rope(&self, range: Range<usize>) -> Self {
        Self {
            rope: Rope::from(self.slice(range)),
        }
    }

    /// Convert to string.
    #[must_use]
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }
}

impl From<&str> for RopeWrapper {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rope_basic() {
        let rope = RopeWrapper::from_str("Hello, world!");
        assert_eq!(rope.len_chars(), 13);
        assert_eq!(rope.get_char(4), Some('o'));
        assert_eq!(rope.get_char(13), None);
    }

    #[test]
    fn test_rope_splice() {
        let mut rope = RopeWrapper::from_str("Hello, world!");
        rope.splice(5..12, &RopeWrapper::from_str(" there"));
        assert_eq!(rope.to_string(), "Hello there!");
        rope.splice(0..0, &RopeWrapper::from_str(">"));
        assert_eq!(rope.to_string(), ">Hello there!");
        rope.splice(1..13, &RopeWrapper::new());
        assert_eq!(rope.to_string(), ">");
    }

    #[test]
    fn test_rope_find() {
        let rope = RopeWrapper::from_str("ab\ncd\nef");
        assert_eq!(rope.find_forward(0, '\n'), Some(2));
        assert_eq!(rope.find_forward(3, '\n'), Some(5));
        assert_eq!(rope.find_forward(6, '\n'), None);
        assert_eq!(rope.find_backward(5, '\n'), Some(2));
        assert_eq!(rope.find_backward(6, '\n'), Some(5));
        assert_eq!(rope.find_backward(2, '\n'), None);
    }

    #[test]
    fn test_rope_multibyte() {
        let rope = RopeWrapper::from_str("héllo wörld");
        assert_eq!(rope.len_chars(), 11);
        assert_eq!(rope.slice(6..11).to_string(), "wörld");
        assert_eq!(rope.sub_rope(0..5).to_string(), "héllo");
    }
}
