//! Core text buffer implementation using rope data structure.
//!
//! ## Why Rope?
//!
//! Bracket scans read the whole document on every pass, while edits land
//! anywhere in it. Ropes give O(log n) insertions/deletions and cheap
//! whole-text reads, which is exactly that access pattern.

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;

use crate::{BufferError, BufferResult, Position, TextChange};

/// Number of leading bytes inspected by [`TextBuffer::looks_binary`].
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// A text buffer backed by a rope data structure.
///
/// # Thread Safety
///
/// `TextBuffer` is `Send` but not `Sync` - it can be moved between threads
/// but shouldn't be accessed from multiple threads simultaneously.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    /// The rope holding our text content
    rope: Rope,

    /// Incremented on every successful mutation
    version: u64,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use prism_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            version: 0,
        }
    }

    /// Heuristic binary check: a NUL byte in the leading block.
    pub fn looks_binary(bytes: &[u8]) -> bool {
        bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
    }

    // ==================== Text Access ====================

    /// Returns the entire text content as a `Cow<str>`.
    ///
    /// # Learning: Cow (Clone-on-Write)
    ///
    /// For small buffers, this returns a borrowed reference (cheap).
    /// For large buffers spanning multiple rope chunks, it allocates.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of characters in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the mutation counter.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<TextChange> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        self.rope.insert(char_idx, text);
        Ok(self.record(char_idx..char_idx, text.chars().count()))
    }

    /// Deletes text in a character range.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<TextChange> {
        self.check_range(&range)?;
        self.rope.remove(range.clone());
        Ok(self.record(range, 0))
    }

    /// Replaces text in a range with new text, as a single change.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> BufferResult<TextChange> {
        self.check_range(&range)?;
        self.rope.remove(range.clone());
        self.rope.insert(range.start, text);
        Ok(self.record(range, text.chars().count()))
    }

    fn record(&mut self, before: Range<usize>, inserted_len: usize) -> TextChange {
        self.version += 1;
        TextChange::new(before, inserted_len, self.version)
    }

    fn check_range(&self, range: &Range<usize>) -> BufferResult<()> {
        if range.start > range.end {
            return Err(BufferError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        Ok(())
    }

    // ==================== Position Conversion ====================

    /// Converts a character index to a Position (line, column).
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);

        Ok(Position {
            line,
            column: char_idx - line_start,
        })
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
            version: 0,
        }
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
