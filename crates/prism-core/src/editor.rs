//! Editor facade.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` wires the subsystems together: documents, their markup models,
//! the highlight manager, the rescan queue and the event bus. A host only
//! forwards its notifications (opened, edited, caret moved, closed) and
//! never touches the manager directly.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use prism_buffer::{SelectionChange, TextChange};
use prism_match::BracketMatch;
use prism_syntax::ClassifierRegistry;

use crate::command::{Command, CommandRegistry};
use crate::config::Config;
use crate::decoration::{Decoration, MarkupModel};
use crate::document::{Document, DocumentId, DocumentManager};
use crate::event::{EditorEvent, EventBus};
use crate::guard::PassGuard;
use crate::highlight::{HighlightManager, HighlightState, PassOutcome, Trigger};
use crate::schedule::RescanQueue;
use crate::{CoreError, CoreResult};

/// The editor state.
///
/// ## Thread Safety
///
/// `Editor` is owned by a single thread. The pieces a host listener may
/// need from elsewhere (`PassGuard`, `RescanQueue`, `EventBus`) are cheap
/// `Clone` handles over shared state.
pub struct Editor {
    /// Document management
    documents: DocumentManager,

    /// Settings, read fresh by every pass
    config: Config,

    /// Span classifiers by language
    classifiers: ClassifierRegistry,

    /// Highlight state for every open document
    highlights: HighlightManager,

    /// One markup model per open document
    layers: HashMap<DocumentId, MarkupModel>,

    /// Documents waiting for a deferred rescan
    rescans: RescanQueue,

    /// Command registry
    commands: CommandRegistry,

    /// Event bus for notifications
    event_bus: EventBus,
}

impl Editor {
    /// Creates an editor with default settings and the bundled grammars.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an editor with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            documents: DocumentManager::new(),
            config,
            classifiers: ClassifierRegistry::with_builtin(),
            highlights: HighlightManager::new(),
            layers: HashMap::new(),
            rescans: RescanQueue::new(),
            commands: CommandRegistry::new(),
            event_bus: EventBus::new(),
        }
    }

    /// Replaces the classifier registry.
    pub fn with_classifiers(mut self, classifiers: ClassifierRegistry) -> Self {
        self.classifiers = classifiers;
        self
    }

    // ==================== Document Lifecycle ====================

    /// Opens a file, or returns the id of the already open document.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> CoreResult<DocumentId> {
        let path = path.as_ref();
        if let Some(id) = self.documents.find_by_path(path) {
            return Ok(id);
        }
        let doc = Document::from_file(path)?;
        Ok(self.open_document(doc))
    }

    /// Starts tracking `doc` and highlights it right away.
    pub fn open_document(&mut self, doc: Document) -> DocumentId {
        let id = doc.id();
        tracing::debug!("Opening {} ({})", doc.name(), doc.file_type());

        let mut layer = MarkupModel::new(doc.buffer().len_chars());
        let guard = self.highlights.guard().clone();
        let rescans = self.rescans.clone();
        // Our own passes also mutate the model; only outside changes count.
        layer.set_listener(move || {
            if !guard.is_active(id) {
                rescans.push(id);
            }
        });

        self.layers.insert(id, layer);
        self.documents.add(doc);
        self.emit(EditorEvent::DocumentOpened(id));

        if let Err(e) = self.pass(id, Trigger::Opened) {
            tracing::warn!("Initial highlight of {} failed: {}", id, e);
        }
        id
    }

    /// Closes a document and disposes its highlights.
    pub fn close_document(&mut self, id: DocumentId) -> CoreResult<()> {
        self.documents.close(id)?;
        match self.layers.get_mut(&id) {
            Some(layer) => self.highlights.close(id, layer),
            None => self.highlights.forget(id),
        }
        self.layers.remove(&id);
        self.rescans.remove(id);
        self.emit(EditorEvent::DocumentClosed(id));
        Ok(())
    }

    // ==================== Host Notifications ====================

    /// Applies an edit and schedules a deferred rescan.
    pub fn edit(&mut self, id: DocumentId, range: Range<usize>, text: &str) -> CoreResult<TextChange> {
        let doc = self
            .documents
            .get_mut(id)
            .ok_or(CoreError::DocumentNotFound(id))?;
        let change = doc.edit(range, text)?;
        let len = doc.buffer().len_chars();

        if let Some(layer) = self.layers.get_mut(&id) {
            layer.set_doc_len(len);
        }
        if !self.highlights.guard().is_active(id) {
            self.rescans.push(id);
        }

        self.emit(EditorEvent::DocumentChanged {
            id,
            change: change.clone(),
        });
        Ok(change)
    }

    /// Handles a caret or selection change.
    ///
    /// Only caret moves with no selection are considered, and those rescan
    /// only a document that has no highlights yet.
    pub fn move_cursor(&mut self, id: DocumentId, change: SelectionChange) -> CoreResult<PassOutcome> {
        if !change.is_cursor_move() {
            return Ok(PassOutcome::Unchanged);
        }
        self.pass(id, Trigger::CursorMoved)
    }

    /// Handles a document becoming visible: a full pass that replaces the
    /// current highlights.
    pub fn show(&mut self, id: DocumentId) -> CoreResult<PassOutcome> {
        self.pass(id, Trigger::Opened)
    }

    /// Runs all deferred rescans. Returns how many passes ran.
    pub fn run_pending(&mut self) -> usize {
        let mut passes = 0;
        while let Some(id) = self.rescans.pop() {
            match self.pass(id, Trigger::Forced) {
                Ok(_) => passes += 1,
                Err(e) => tracing::debug!("Dropping rescan: {}", e),
            }
        }
        passes
    }

    // ==================== Commands ====================

    /// Forces a full pass on one document.
    pub fn refresh(&mut self, id: DocumentId) -> CoreResult<PassOutcome> {
        self.pass(id, Trigger::Forced)
    }

    /// Forces a full pass on every open document.
    pub fn refresh_all(&mut self) {
        let ids = self.documents.order().to_vec();
        for id in ids {
            if let Err(e) = self.pass(id, Trigger::Forced) {
                tracing::warn!("Refresh of {} failed: {}", id, e);
            }
        }
    }

    /// Flips the global switch and rehighlights everything.
    pub fn toggle_highlighting(&mut self) {
        self.config.enabled = !self.config.enabled;
        tracing::info!(
            "Bracket highlighting {}",
            if self.config.enabled { "enabled" } else { "disabled" }
        );
        self.emit(EditorEvent::HighlightingToggled(self.config.enabled));
        self.refresh_all();
    }

    /// Replaces the settings and rehighlights everything.
    pub fn apply_config(&mut self, config: Config) {
        self.config = config;
        self.emit(EditorEvent::ConfigChanged);
        self.refresh_all();
    }

    /// Reloads settings from `path` (or the default location) and applies
    /// them. An unreadable file falls back to defaults.
    pub fn reload_config(&mut self, path: Option<&Path>) -> CoreResult<()> {
        let config = match path {
            Some(path) => Config::load_from(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load {}: {}, using defaults", path.display(), e);
                Config::default()
            }),
            None => Config::load(),
        };
        self.apply_config(config);
        Ok(())
    }

    /// Persists the current settings.
    pub fn save_config(&self, path: Option<&Path>) -> CoreResult<()> {
        match path {
            Some(path) => self.config.save_to(path)?,
            None => self.config.save()?,
        }
        Ok(())
    }

    /// Executes a command.
    ///
    /// Runs against a snapshot of the registry, so handlers may call back
    /// into `execute`. Commands registered during the call are kept but are
    /// not visible until it returns.
    pub fn execute(&mut self, cmd: &Command) -> CoreResult<()> {
        let commands = self.commands.clone();
        commands.execute(cmd, self)
    }

    /// Returns the command registry for registering custom commands.
    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    // ==================== Accessors ====================

    /// Returns the editor configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a document by ID.
    pub fn document(&self, id: DocumentId) -> CoreResult<&Document> {
        self.documents
            .get(id)
            .ok_or(CoreError::DocumentNotFound(id))
    }

    /// Returns all open documents.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Bracket matches currently rendered for a document.
    pub fn matches(&self, id: DocumentId) -> &[BracketMatch] {
        self.highlights.matches(id)
    }

    /// Decorations currently rendered for a document, by offset.
    pub fn decorations(&self, id: DocumentId) -> Vec<&Decoration> {
        self.layers
            .get(&id)
            .map(MarkupModel::decorations)
            .unwrap_or_default()
    }

    pub fn highlight_state(&self, id: DocumentId) -> &HighlightState {
        self.highlights.state(id)
    }

    /// Number of matcher runs since the editor was created.
    pub fn scan_count(&self) -> u64 {
        self.highlights.scan_count()
    }

    /// Number of documents waiting for a deferred rescan.
    pub fn pending_rescans(&self) -> usize {
        self.rescans.len()
    }

    /// Shared re-entrancy guard, for host-side listeners.
    pub fn pass_guard(&self) -> PassGuard {
        self.highlights.guard().clone()
    }

    // ==================== Events ====================

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }

    fn pass(&mut self, id: DocumentId, trigger: Trigger) -> CoreResult<PassOutcome> {
        let doc = self
            .documents
            .get(id)
            .ok_or(CoreError::DocumentNotFound(id))?;
        let layer = self
            .layers
            .get_mut(&id)
            .ok_or(CoreError::DocumentNotFound(id))?;

        let outcome = self
            .highlights
            .refresh(doc, trigger, &self.config, &self.classifiers, layer);

        match &outcome {
            PassOutcome::Highlighted {
                pairs, decorations, ..
            } => self.emit(EditorEvent::HighlightsUpdated {
                id,
                pairs: *pairs,
                decorations: *decorations,
            }),
            PassOutcome::Failed => self.emit(EditorEvent::HighlightsUpdated {
                id,
                pairs: 0,
                decorations: 0,
            }),
            PassOutcome::Suppressed(reason) => self.emit(EditorEvent::HighlightsCleared {
                id,
                reason: *reason,
            }),
            PassOutcome::Unchanged | PassOutcome::Reentrant => {}
        }
        Ok(outcome)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
