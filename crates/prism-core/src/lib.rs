//! # Prism Core
//!
//! Highlight state management for nesting-aware bracket colorization.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Editor                              │
//! │  ┌──────────┐ ┌──────────────┐ ┌─────────────┐ ┌───────────┐ │
//! │  │  Config  │ │ RescanQueue  │ │  EventBus   │ │ Commands  │ │
//! │  └──────────┘ └──────────────┘ └─────────────┘ └───────────┘ │
//! │        │                                                      │
//! │  ┌─────┴────────────────────────────────┐  ┌───────────────┐ │
//! │  │          HighlightManager            │──│  PassGuard    │ │
//! │  │   classify ──► match ──► render      │  └───────────────┘ │
//! │  └──────────────────────────────────────┘                    │
//! │        │                         │                            │
//! │  ┌─────┴──────────┐   ┌──────────┴─────────┐                 │
//! │  │ DocumentManager│   │ MarkupModel per doc│                 │
//! │  └────────────────┘   └────────────────────┘                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod color;
pub mod command;
pub mod config;
pub mod decoration;
pub mod document;
pub mod editor;
pub mod event;
pub mod guard;
pub mod highlight;
pub mod schedule;

pub use color::{Color, ColorRamp};
pub use command::{Command, CommandContext, CommandHandler, CommandRegistry};
pub use config::{Config, ConfigError, PairToggles, Theme};
pub use decoration::{Decoration, DecorationError, DecorationLayer, HighlightHandle, MarkupModel};
pub use document::{Document, DocumentId, DocumentManager};
pub use editor::Editor;
pub use event::{EditorEvent, EventBus};
pub use guard::{PassGuard, PassToken};
pub use highlight::{HighlightManager, HighlightSet, HighlightState, PassOutcome, SuppressReason, Trigger};
pub use schedule::RescanQueue;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] prism_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command not found: {0}")]
    CommandNotFound(String),
}
