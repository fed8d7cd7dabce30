//! Non-structural span types.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Why a range is excluded from bracket scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Comment,
    String,
    Char,
    Whitespace,
}

impl SpanKind {
    /// Maps a tokenizer node/token name to a span kind.
    ///
    /// Matching is by substring on the uppercased name, so `line_comment`,
    /// `block_comment`, `raw_string_literal` and `char_literal` all map.
    pub fn from_token_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        if upper.contains("COMMENT") {
            Some(SpanKind::Comment)
        } else if upper.contains("STRING") {
            Some(SpanKind::String)
        } else if upper.contains("CHAR") {
            Some(SpanKind::Char)
        } else if upper == "WHITE_SPACE" || upper == "WHITESPACE" {
            Some(SpanKind::Whitespace)
        } else {
            None
        }
    }
}

/// A half-open character range `[start, end)` that is not code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonStructuralSpan {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

impl NonStructuralSpan {
    pub fn new(start: usize, end: usize, kind: SpanKind) -> Self {
        Self { start, end, kind }
    }

    /// Returns true if `pos` lies in `[start, end)`.
    #[inline]
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Sorted, pairwise non-overlapping spans with O(log n) membership.
///
/// Construction normalizes whatever the classifier produced: empty spans
/// are dropped, the rest sorted by start, and overlapping or touching spans
/// merged (the earlier span's kind wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanSet {
    spans: Vec<NonStructuralSpan>,
}

impl SpanSet {
    /// An empty set: every position is code.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spans(spans: impl IntoIterator<Item = NonStructuralSpan>) -> Self {
        let mut spans: Vec<_> = spans.into_iter().filter(|s| !s.is_empty()).collect();
        spans.sort_by_key(|s| (s.start, s.end));

        let mut merged: Vec<NonStructuralSpan> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if span.start <= last.end => {
                    last.end = last.end.max(span.end);
                }
                _ => merged.push(span),
            }
        }

        Self { spans: merged }
    }

    /// Returns true if any span contains `pos`.
    pub fn contains(&self, pos: usize) -> bool {
        self.span_at(pos).is_some()
    }

    /// Returns the span containing `pos`, if any.
    pub fn span_at(&self, pos: usize) -> Option<&NonStructuralSpan> {
        let idx = self.spans.partition_point(|s| s.start <= pos);
        self.spans[..idx].last().filter(|s| s.contains(pos))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NonStructuralSpan> {
        self.spans.iter()
    }

    pub fn as_slice(&self) -> &[NonStructuralSpan] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl FromIterator<NonStructuralSpan> for SpanSet {
    fn from_iter<I: IntoIterator<Item = NonStructuralSpan>>(iter: I) -> Self {
        Self::from_spans(iter)
    }
}

impl<'a> IntoIterator for &'a SpanSet {
    type Item = &'a NonStructuralSpan;
    type IntoIter = std::slice::Iter<'a, NonStructuralSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}
