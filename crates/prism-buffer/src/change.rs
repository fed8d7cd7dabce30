//! Change records emitted by buffer mutations.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Describes one mutation of a [`TextBuffer`](crate::TextBuffer).
///
/// `before` is the character range that was replaced, in pre-edit
/// coordinates. `after` is the range now occupied by the new text, in
/// post-edit coordinates. A pure insert has an empty `before`; a pure
/// delete has an empty `after`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChange {
    /// Replaced range before the edit
    pub before: Range<usize>,
    /// Range of the inserted text after the edit
    pub after: Range<usize>,
    /// Buffer version after the edit was applied
    pub version: u64,
}

impl TextChange {
    pub(crate) fn new(before: Range<usize>, inserted_len: usize, version: u64) -> Self {
        let after = before.start..before.start + inserted_len;
        Self {
            before,
            after,
            version,
        }
    }

    /// Returns true if the change inserted text without removing any.
    pub fn is_insert(&self) -> bool {
        self.before.is_empty() && !self.after.is_empty()
    }

    /// Returns true if the change removed text without inserting any.
    pub fn is_delete(&self) -> bool {
        !self.before.is_empty() && self.after.is_empty()
    }

    /// Net change in character count.
    pub fn delta(&self) -> isize {
        self.after.len() as isize - self.before.len() as isize
    }
}
