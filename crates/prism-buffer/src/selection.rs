//! Text selection handling.
//!
//! ## Learning: Range Types
//!
//! Selections use exclusive character ranges because:
//! - Empty selections (start == end) are natural: that is a bare cursor
//! - Length is simply `end - start`
//! - They line up with `Range<usize>` slicing semantics

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A selection of text in the buffer, in character offsets.
///
/// The start is always before or equal to the end (normalized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Selection {
    /// Creates a new selection, normalizing so start <= end.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a zero-width selection (cursor position).
    pub fn cursor(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns true if this is a zero-width selection (just a cursor).
    pub fn is_cursor(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if an offset is within this selection.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Returns the selection as a range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A selection transition reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionChange {
    /// Selection before the move
    pub old: Selection,
    /// Selection after the move
    pub new: Selection,
}

impl SelectionChange {
    pub fn new(old: Selection, new: Selection) -> Self {
        Self { old, new }
    }

    /// True when only the caret moved: neither side selects any text.
    pub fn is_cursor_move(&self) -> bool {
        self.old.is_cursor() && self.new.is_cursor()
    }
}
