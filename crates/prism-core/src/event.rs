//! Event system for highlight notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Rust's ownership model makes traditional observer patterns tricky.
//! We use `tokio::sync::broadcast` for a safe, async-friendly event bus.
//!
//! Key differences from OOP observers:
//! - No object references to manage
//! - Events are values, not callbacks
//! - Subscribers receive copies (Clone)

use prism_buffer::TextChange;
use tokio::sync::broadcast;

use crate::document::DocumentId;
use crate::highlight::SuppressReason;

/// Events published by the editor facade.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    // Document events
    /// A document was opened
    DocumentOpened(DocumentId),
    /// A document's content changed
    DocumentChanged { id: DocumentId, change: TextChange },
    /// A document was closed
    DocumentClosed(DocumentId),

    // Highlight events
    /// A full pass replaced the document's highlights
    HighlightsUpdated {
        id: DocumentId,
        pairs: usize,
        decorations: usize,
    },
    /// The document's highlights were removed
    HighlightsCleared { id: DocumentId, reason: SuppressReason },

    // Settings events
    /// The global switch was flipped
    HighlightingToggled(bool),
    /// Configuration changed
    ConfigChanged,
}

/// Event bus for broadcasting editor events.
///
/// ## Design
///
/// A broadcast channel allows several subscribers and async reception, and
/// a lagging receiver never blocks the sender.
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to events.
    ///
    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
