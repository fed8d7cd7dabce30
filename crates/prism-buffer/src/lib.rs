//! # Prism Buffer
//!
//! Rope-backed text buffer that reports every mutation as a [`TextChange`].
//!
//! ## Key Concepts
//!
//! ### Ownership & Borrowing
//! - `TextBuffer` owns the rope data structure
//! - Methods like `text()` return borrowed views (`Cow<str>`)
//! - Mutations require `&mut self` and hand back a change record
//!
//! ### Change Notifications
//! Every successful insert/delete/replace returns a `TextChange` carrying
//! the replaced range before the edit and the resulting range after it.
//! Consumers (the highlight manager) decide what to do with it; the buffer
//! itself never calls back into anyone.

mod buffer;
mod change;
mod selection;

pub use buffer::TextBuffer;
pub use change::TextChange;
pub use selection::{Selection, SelectionChange};

use serde::{Deserialize, Serialize};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Invalid range: {start}..{end}")]
    InvalidRange { start: usize, end: usize },
}

/// A line/column position in the buffer.
///
/// Both line and column are 0-indexed; the column counts characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters not bytes)
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_chars(), 0);
        assert_eq!(buffer.version(), 0);
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TextBuffer::from("fn main() {}");
        assert_eq!(buffer.len_chars(), 12);
        assert_eq!(buffer.text(), "fn main() {}");
    }

    #[test]
    fn test_position_display_is_one_based() {
        assert_eq!(Position::new(0, 0).to_string(), "1:1");
        assert_eq!(Position::new(2, 7).to_string(), "3:8");
    }
}
