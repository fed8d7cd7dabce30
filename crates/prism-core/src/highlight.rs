//! Highlight state management.
//!
//! One [`HighlightManager`] tracks every open document. For each incoming
//! trigger it decides between a full rescan, a no-op, or clearing, and it
//! is the only writer of bracket decorations.
//!
//! ```text
//!   Opened / Forced ──► guard ──► suppressed? ──► dispose old ──► classify ──► match ──► render
//!   CursorMoved ──────► guard ──► suppressed? ──► already highlighted? ──► no-op
//! ```
//!
//! ## Learning: Catching Panics at a Boundary
//!
//! `std::panic::catch_unwind` turns a panic inside the pipeline into an
//! `Err`. The closure is wrapped in `AssertUnwindSafe` because it borrows
//! the decoration layer mutably; after a panic we only dispose what was
//! already rendered and never read half-updated state.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use prism_match::BracketMatch;
use prism_syntax::{ClassifierRegistry, SpanSet};

use crate::config::Config;
use crate::decoration::{Decoration, DecorationLayer, HighlightHandle};
use crate::document::{Document, DocumentId};
use crate::guard::PassGuard;

/// Why a pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Document opened or became visible
    Opened,
    /// Edit, toggle or settings change
    Forced,
    /// Caret moved with an empty selection
    CursorMoved,
}

/// Why a document carries no highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    Disabled,
    Excluded,
    Binary,
}

impl std::fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SuppressReason::Disabled => "highlighting disabled",
            SuppressReason::Excluded => "file type excluded",
            SuppressReason::Binary => "binary file",
        };
        f.write_str(reason)
    }
}

/// The decorations currently rendered for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet {
    handles: Vec<HighlightHandle>,
    matches: Vec<BracketMatch>,
}

impl HighlightSet {
    pub fn handles(&self) -> &[HighlightHandle] {
        &self.handles
    }

    pub fn matches(&self) -> &[BracketMatch] {
        &self.matches
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Per-document highlight state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HighlightState {
    #[default]
    Uninitialized,
    Highlighted(HighlightSet),
    Suppressed(SuppressReason),
}

impl HighlightState {
    pub fn is_highlighted(&self) -> bool {
        matches!(self, HighlightState::Highlighted(_))
    }
}

/// What a call to [`HighlightManager::refresh`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// A full pass ran and replaced the highlight set
    Highlighted {
        pairs: usize,
        decorations: usize,
        skipped: usize,
    },
    /// Nothing to do, the existing set stays
    Unchanged,
    /// Highlights cleared and the document suppressed
    Suppressed(SuppressReason),
    /// A pass for this document was already running
    Reentrant,
    /// The pipeline failed; the document is left with an empty set
    Failed,
}

/// Owns highlight state for all open documents.
#[derive(Debug, Default)]
pub struct HighlightManager {
    /// State per open document
    states: HashMap<DocumentId, HighlightState>,

    /// Documents with a pass in progress
    guard: PassGuard,

    /// Number of matcher invocations so far
    scans: u64,
}

impl HighlightManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs (or skips) a highlight pass for `doc`.
    ///
    /// Never fails: classifier, matcher and decoration errors are logged
    /// and folded into the returned [`PassOutcome`].
    pub fn refresh(
        &mut self,
        doc: &Document,
        trigger: Trigger,
        config: &Config,
        classifiers: &ClassifierRegistry,
        layer: &mut dyn DecorationLayer,
    ) -> PassOutcome {
        let Some(token) = self.guard.enter(doc.id()) else {
            tracing::debug!("Ignoring {:?} for {}: pass already running", trigger, doc.id());
            return PassOutcome::Reentrant;
        };
        let id = token.id();

        if let Some(reason) = suppression(doc, config) {
            self.clear(id, layer);
            self.states.insert(id, HighlightState::Suppressed(reason));
            tracing::debug!("Suppressed highlights for {}: {}", doc.name(), reason);
            return PassOutcome::Suppressed(reason);
        }

        if trigger == Trigger::CursorMoved
            && self.states.get(&id).is_some_and(HighlightState::is_highlighted)
        {
            return PassOutcome::Unchanged;
        }

        self.clear(id, layer);

        let mut handles = Vec::new();
        let mut skipped = 0;
        let scans = &mut self.scans;
        let result = catch_unwind(AssertUnwindSafe(|| {
            run_pass(doc, config, classifiers, &mut *layer, &mut handles, &mut skipped, scans)
        }));

        match result {
            Ok(matches) => {
                let outcome = PassOutcome::Highlighted {
                    pairs: matches.len(),
                    decorations: handles.len(),
                    skipped,
                };
                tracing::debug!(
                    pairs = matches.len(),
                    decorations = handles.len(),
                    skipped,
                    "Highlighted {} ({:?})",
                    doc.name(),
                    trigger
                );
                self.states
                    .insert(id, HighlightState::Highlighted(HighlightSet { handles, matches }));
                outcome
            }
            Err(_) => {
                tracing::warn!("Highlight pass for {} panicked, clearing", doc.name());
                dispose_all(layer, &handles);
                self.states
                    .insert(id, HighlightState::Highlighted(HighlightSet::default()));
                PassOutcome::Failed
            }
        }
    }

    /// Disposes the document's highlights and forgets it.
    pub fn close(&mut self, id: DocumentId, layer: &mut dyn DecorationLayer) {
        self.clear(id, layer);
        self.states.remove(&id);
    }

    /// Forgets a document whose decoration layer is already gone.
    pub fn forget(&mut self, id: DocumentId) {
        self.states.remove(&id);
    }

    /// Current state of a document; unknown documents are uninitialized.
    pub fn state(&self, id: DocumentId) -> &HighlightState {
        const UNINITIALIZED: &HighlightState = &HighlightState::Uninitialized;
        self.states.get(&id).unwrap_or(UNINITIALIZED)
    }

    /// Matches behind the currently rendered highlights.
    pub fn matches(&self, id: DocumentId) -> &[BracketMatch] {
        match self.states.get(&id) {
            Some(HighlightState::Highlighted(set)) => set.matches(),
            _ => &[],
        }
    }

    /// Number of times the matcher has run.
    pub fn scan_count(&self) -> u64 {
        self.scans
    }

    /// Shared handle to the re-entrancy guard.
    pub fn guard(&self) -> &PassGuard {
        &self.guard
    }

    fn clear(&mut self, id: DocumentId, layer: &mut dyn DecorationLayer) {
        if let Some(HighlightState::Highlighted(set)) = self.states.get_mut(&id) {
            let handles = std::mem::take(&mut set.handles);
            set.matches.clear();
            dispose_all(layer, &handles);
        }
    }
}

fn suppression(doc: &Document, config: &Config) -> Option<SuppressReason> {
    if !config.enabled {
        Some(SuppressReason::Disabled)
    } else if doc.is_binary() {
        Some(SuppressReason::Binary)
    } else if config.is_excluded(&doc.file_type()) {
        Some(SuppressReason::Excluded)
    } else {
        None
    }
}

fn run_pass(
    doc: &Document,
    config: &Config,
    classifiers: &ClassifierRegistry,
    layer: &mut dyn DecorationLayer,
    handles: &mut Vec<HighlightHandle>,
    skipped: &mut usize,
    scans: &mut u64,
) -> Vec<BracketMatch> {
    let text = doc.text();
    let spans = if config.skip_non_structural {
        classifiers.classify(doc.language(), &text)
    } else {
        SpanSet::new()
    };

    *scans += 1;
    let matcher = config.matcher();
    tracing::trace!(
        "Scanning {} with {} pairs, {:?} nesting, {} spans",
        doc.name(),
        matcher.pairs().len(),
        matcher.options().nesting,
        spans.len()
    );
    let matches = matcher.scan(&text, &spans);

    let ramp = config.ramp();
    for m in &matches {
        let color = ramp.color_for(m.level);
        for offset in [m.open, m.close] {
            match layer.add(Decoration::bracket(offset, color)) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!("Skipping decoration at {}: {}", offset, e);
                    *skipped += 1;
                }
            }
        }
    }
    matches
}

fn dispose_all(layer: &mut dyn DecorationLayer, handles: &[HighlightHandle]) {
    for &handle in handles {
        if let Err(e) = layer.dispose(handle) {
            tracing::debug!("Dispose failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::DEFAULT_DARK;
    use crate::decoration::{DecorationError, MarkupModel};
    use prism_match::PairKind;

    fn model(doc: &Document) -> MarkupModel {
        MarkupModel::new(doc.buffer().len_chars())
    }

    fn pass(
        manager: &mut HighlightManager,
        doc: &Document,
        trigger: Trigger,
        config: &Config,
        layer: &mut dyn DecorationLayer,
    ) -> PassOutcome {
        manager.refresh(doc, trigger, config, &ClassifierRegistry::new(), layer)
    }

    /// Rejects every other decoration.
    struct Flaky {
        inner: MarkupModel,
        calls: usize,
    }

    impl DecorationLayer for Flaky {
        fn add(&mut self, decoration: Decoration) -> Result<HighlightHandle, DecorationError> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                return Err(DecorationError::Rejected("busy".to_string()));
            }
            self.inner.add(decoration)
        }

        fn dispose(&mut self, handle: HighlightHandle) -> Result<(), DecorationError> {
            self.inner.dispose(handle)
        }
    }

    /// Panics after rendering one decoration.
    struct Exploding {
        inner: MarkupModel,
    }

    impl DecorationLayer for Exploding {
        fn add(&mut self, decoration: Decoration) -> Result<HighlightHandle, DecorationError> {
            if !self.inner.is_empty() {
                panic!("layer exploded");
            }
            self.inner.add(decoration)
        }

        fn dispose(&mut self, handle: HighlightHandle) -> Result<(), DecorationError> {
            self.inner.dispose(handle)
        }
    }

    #[test]
    fn test_scenario_colors_by_level() {
        let doc = Document::new("foo(bar[baz]{qux})");
        let mut layer = model(&doc);
        let mut manager = HighlightManager::new();
        let config = Config::default();

        let outcome = pass(&mut manager, &doc, Trigger::Opened, &config, &mut layer);
        assert_eq!(
            outcome,
            PassOutcome::Highlighted {
                pairs: 3,
                decorations: 6,
                skipped: 0
            }
        );

        let found: Vec<_> = manager
            .matches(doc.id())
            .iter()
            .map(|m| (m.open, m.close, m.level))
            .collect();
        assert_eq!(found, vec![(7, 11, 0), (12, 16, 0), (3, 17, 0)]);

        assert_eq!(layer.decoration_at(3).map(|d| d.color), Some(DEFAULT_DARK[0]));
        assert_eq!(layer.decoration_at(7).map(|d| d.color), Some(DEFAULT_DARK[0]));
        assert_eq!(layer.decoration_at(16).map(|d| d.color), Some(DEFAULT_DARK[0]));
        assert!(layer.decoration_at(0).is_none());
    }

    #[test]
    fn test_rescan_replaces_set() {
        let doc = Document::new("(a)(b)");
        let mut layer = model(&doc);
        let mut manager = HighlightManager::new();
        let config = Config::default();

        pass(&mut manager, &doc, Trigger::Opened, &config, &mut layer);
        pass(&mut manager, &doc, Trigger::Forced, &config, &mut layer);

        assert_eq!(layer.len(), 4);
        assert_eq!(manager.scan_count(), 2);
    }

    #[test]
    fn test_cursor_move_skips_matcher_when_highlighted() {
        let doc = Document::new("f(x)");
        let mut layer = model(&doc);
        let mut manager = HighlightManager::new();
        let config = Config::default();

        pass(&mut manager, &doc, Trigger::Opened, &config, &mut layer);
        let before = manager.scan_count();
        for _ in 0..10 {
            let outcome = pass(&mut manager, &doc, Trigger::CursorMoved, &config, &mut layer);
            assert_eq!(outcome, PassOutcome::Unchanged);
        }
        assert_eq!(manager.scan_count(), before);
    }

    #[test]
    fn test_cursor_move_highlights_uninitialized_document() {
        let doc = Document::new("f(x)");
        let mut layer = model(&doc);
        let mut manager = HighlightManager::new();

        let outcome = pass(&mut manager, &doc, Trigger::CursorMoved, &Config::default(), &mut layer);
        assert!(matches!(outcome, PassOutcome::Highlighted { pairs: 1, .. }));
        assert_eq!(manager.scan_count(), 1);
    }

    #[test]
    fn test_disable_disposes_everything() {
        let doc = Document::new("{[()]}");
        let mut layer = model(&doc);
        let mut manager = HighlightManager::new();
        let mut config = Config::default();

        pass(&mut manager, &doc, Trigger::Opened, &config, &mut layer);
        assert_eq!(layer.len(), 6);

        config.enabled = false;
        let outcome = pass(&mut manager, &doc, Trigger::Forced, &config, &mut layer);
        assert_eq!(outcome, PassOutcome::Suppressed(SuppressReason::Disabled));
        assert!(layer.is_empty());
        assert_eq!(
            manager.state(doc.id()),
            &HighlightState::Suppressed(SuppressReason::Disabled)
        );

        // Suppression wins over the cursor shortcut.
        let outcome = pass(&mut manager, &doc, Trigger::CursorMoved, &config, &mut layer);
        assert_eq!(outcome, PassOutcome::Suppressed(SuppressReason::Disabled));
    }

    #[test]
    fn test_excluded_and_binary_documents() {
        let mut config = Config::default();
        config.set_excluded_from_str("Markdown");
        let mut manager = HighlightManager::new();

        let notes = Document::new("(x)").with_path("README.md");
        let mut layer = model(&notes);
        let outcome = pass(&mut manager, &notes, Trigger::Opened, &config, &mut layer);
        assert_eq!(outcome, PassOutcome::Suppressed(SuppressReason::Excluded));
        assert!(layer.is_empty());

        let mut blob = Document::new("(x)");
        blob.set_binary(true);
        let mut layer = model(&blob);
        let outcome = pass(&mut manager, &blob, Trigger::Opened, &config, &mut layer);
        assert_eq!(outcome, PassOutcome::Suppressed(SuppressReason::Binary));
        assert_eq!(manager.scan_count(), 0);
    }

    #[test]
    fn test_rejected_decorations_are_skipped() {
        let doc = Document::new("(a)[b]");
        let mut layer = Flaky {
            inner: model(&doc),
            calls: 0,
        };
        let mut manager = HighlightManager::new();

        let outcome = pass(&mut manager, &doc, Trigger::Opened, &Config::default(), &mut layer);
        assert_eq!(
            outcome,
            PassOutcome::Highlighted {
                pairs: 2,
                decorations: 2,
                skipped: 2
            }
        );
        assert_eq!(layer.inner.len(), 2);
    }

    #[test]
    fn test_panic_leaves_empty_set() {
        let doc = Document::new("(a)(b)");
        let mut layer = Exploding { inner: model(&doc) };
        let mut manager = HighlightManager::new();

        let outcome = pass(&mut manager, &doc, Trigger::Opened, &Config::default(), &mut layer);
        assert_eq!(outcome, PassOutcome::Failed);
        assert!(layer.inner.is_empty());
        assert_eq!(
            manager.state(doc.id()),
            &HighlightState::Highlighted(HighlightSet::default())
        );
        assert!(!manager.guard().is_active(doc.id()));
    }

    #[test]
    fn test_reentrant_pass_is_ignored() {
        let doc = Document::new("()");
        let mut layer = model(&doc);
        let mut manager = HighlightManager::new();

        let _token = manager.guard().enter(doc.id());
        let outcome = pass(&mut manager, &doc, Trigger::Forced, &Config::default(), &mut layer);
        assert_eq!(outcome, PassOutcome::Reentrant);
        assert_eq!(manager.scan_count(), 0);
    }

    #[test]
    fn test_close_forgets_document() {
        let doc = Document::new("<()>");
        let mut layer = model(&doc);
        let mut manager = HighlightManager::new();

        pass(&mut manager, &doc, Trigger::Opened, &Config::default(), &mut layer);
        manager.close(doc.id(), &mut layer);

        assert!(layer.is_empty());
        assert_eq!(manager.state(doc.id()), &HighlightState::Uninitialized);
    }

    #[test]
    fn test_disabled_family_is_not_rendered() {
        let doc = Document::new("Vec<u8>(x)");
        let mut layer = model(&doc);
        let mut manager = HighlightManager::new();
        let mut config = Config::default();
        config.pairs.angle = false;

        pass(&mut manager, &doc, Trigger::Opened, &config, &mut layer);
        let kinds: Vec<_> = manager.matches(doc.id()).iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![PairKind::Round]);
    }
}
