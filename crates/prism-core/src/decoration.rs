//! Decoration layer: where rendered bracket colors live.
//!
//! The highlight manager talks to decorations only through the
//! [`DecorationLayer`] trait, so a host can plug in its own markup model.
//! [`MarkupModel`] is the in-memory implementation used by the editor
//! facade, the CLI and the tests.
//!
//! ## Learning: Change Listeners
//!
//! Hosts usually notify listeners whenever a markup model changes, including
//! changes we made ourselves. A listener that reacts by rescanning would loop
//! forever; the editor breaks that loop by consulting the `PassGuard` from
//! inside its listener.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::color::Color;

/// Layer the bracket decorations are painted on. Above selection so the
/// colors stay visible inside a selected block.
pub const BRACKET_LAYER: u32 = SELECTION_LAYER + 100;

/// Layer of the host's selection highlight.
pub const SELECTION_LAYER: u32 = 6000;

/// Opaque handle to a rendered decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HighlightHandle(u64);

impl HighlightHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A foreground-color decoration over a character range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: Range<usize>,
    pub color: Color,
    pub bold: bool,
    pub layer: u32,
}

impl Decoration {
    /// A bold bracket decoration covering the single character at `offset`.
    pub fn bracket(offset: usize, color: Color) -> Self {
        Self {
            range: offset..offset + 1,
            color,
            bold: true,
            layer: BRACKET_LAYER,
        }
    }
}

/// Errors from a decoration layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecorationError {
    #[error("Decoration range {start}..{end} outside document of length {len}")]
    OutOfRange { start: usize, end: usize, len: usize },

    #[error("Unknown decoration handle: {0:?}")]
    UnknownHandle(HighlightHandle),

    #[error("Decoration rejected: {0}")]
    Rejected(String),
}

/// Something decorations can be added to and removed from.
pub trait DecorationLayer {
    /// Adds a decoration and returns its handle.
    fn add(&mut self, decoration: Decoration) -> Result<HighlightHandle, DecorationError>;

    /// Removes a previously added decoration.
    fn dispose(&mut self, handle: HighlightHandle) -> Result<(), DecorationError>;
}

type Listener = Box<dyn FnMut() + Send>;

/// In-memory markup model for one document.
pub struct MarkupModel {
    /// Live decorations keyed by handle
    decorations: BTreeMap<HighlightHandle, Decoration>,

    /// Next handle value
    next_handle: u64,

    /// Length of the decorated document in chars
    doc_len: usize,

    /// Called after every successful mutation
    listener: Option<Listener>,
}

impl MarkupModel {
    /// Creates a model for a document of `doc_len` characters.
    pub fn new(doc_len: usize) -> Self {
        Self {
            decorations: BTreeMap::new(),
            next_handle: 0,
            doc_len,
            listener: None,
        }
    }

    /// Installs the change listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl FnMut() + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Updates the document length after an edit.
    pub fn set_doc_len(&mut self, doc_len: usize) {
        self.doc_len = doc_len;
    }

    pub fn doc_len(&self) -> usize {
        self.doc_len
    }

    pub fn get(&self, handle: HighlightHandle) -> Option<&Decoration> {
        self.decorations.get(&handle)
    }

    /// Live decorations ordered by start offset.
    pub fn decorations(&self) -> Vec<&Decoration> {
        let mut all: Vec<_> = self.decorations.values().collect();
        all.sort_by_key(|d| d.range.start);
        all
    }

    /// Decoration covering `offset`, if any.
    pub fn decoration_at(&self, offset: usize) -> Option<&Decoration> {
        self.decorations.values().find(|d| d.range.contains(&offset))
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener();
        }
    }
}

impl DecorationLayer for MarkupModel {
    fn add(&mut self, decoration: Decoration) -> Result<HighlightHandle, DecorationError> {
        let Range { start, end } = decoration.range;
        if start >= end || end > self.doc_len {
            return Err(DecorationError::OutOfRange {
                start,
                end,
                len: self.doc_len,
            });
        }

        let handle = HighlightHandle(self.next_handle);
        self.next_handle += 1;
        self.decorations.insert(handle, decoration);
        self.notify();
        Ok(handle)
    }

    fn dispose(&mut self, handle: HighlightHandle) -> Result<(), DecorationError> {
        self.decorations
            .remove(&handle)
            .ok_or(DecorationError::UnknownHandle(handle))?;
        self.notify();
        Ok(())
    }
}

impl std::fmt::Debug for MarkupModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkupModel")
            .field("decorations", &self.decorations)
            .field("doc_len", &self.doc_len)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
