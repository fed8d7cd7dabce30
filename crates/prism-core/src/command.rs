//! Command surface for highlighting actions.
//!
//! ## Trait Objects vs Enums
//!
//! Built-in commands are an enum (exhaustive, no allocation); host-defined
//! commands go through `dyn CommandHandler` (extensible, heap allocated).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::CoreResult;
use crate::document::DocumentId;
use crate::editor::Editor;

/// Built-in commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Command {
    /// Flip the global switch and rehighlight every open document
    ToggleHighlighting,
    /// Rehighlight every open document
    RefreshAll,
    /// Rehighlight one document
    Refresh { id: DocumentId },
    /// Reload settings from a file (default location if `None`) and apply
    ReloadConfig { path: Option<PathBuf> },

    // Custom command (name, arguments)
    Custom { name: String, args: Vec<String> },
}

impl Command {
    /// Returns the command's display name.
    pub fn display_name(&self) -> &str {
        match self {
            Command::ToggleHighlighting => "Toggle Bracket Highlighting",
            Command::RefreshAll => "Refresh All Bracket Highlights",
            Command::Refresh { .. } => "Refresh Bracket Highlights",
            Command::ReloadConfig { .. } => "Reload Bracket Settings",
            Command::Custom { name, .. } => name,
        }
    }
}

/// Context passed to command execution.
pub struct CommandContext<'a> {
    pub editor: &'a mut Editor,
}

/// Trait for custom command handlers.
///
/// ## Learning: Trait Objects
///
/// `dyn CommandHandler` allows storing different types that implement this
/// trait in the same collection. The `Send + Sync` bounds ensure thread
/// safety.
pub trait CommandHandler: Send + Sync {
    /// Returns the command name.
    fn name(&self) -> &str;

    /// Executes the command.
    fn execute(&self, ctx: &mut CommandContext, args: &[String]) -> CoreResult<()>;

    /// Returns a description for the command palette.
    fn description(&self) -> &str {
        self.name()
    }
}

/// Registry for commands.
///
/// Handlers are shared, so cloning the registry is cheap. The editor runs
/// commands from a clone, which lets a handler execute other commands (or
/// register new ones) through `ctx.editor`.
#[derive(Clone)]
pub struct CommandRegistry {
    /// Custom command handlers
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Creates a new registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a custom command handler.
    pub fn register(&mut self, handler: Box<dyn CommandHandler>) {
        let name = handler.name().to_string();
        self.handlers.insert(name, Arc::from(handler));
    }

    /// Executes a command.
    pub fn execute(&self, cmd: &Command, editor: &mut Editor) -> CoreResult<()> {
        let mut ctx = CommandContext { editor };

        match cmd {
            Command::ToggleHighlighting => {
                ctx.editor.toggle_highlighting();
                Ok(())
            }
            Command::RefreshAll => {
                ctx.editor.refresh_all();
                Ok(())
            }
            Command::Refresh { id } => ctx.editor.refresh(*id).map(|_| ()),
            Command::ReloadConfig { path } => ctx.editor.reload_config(path.as_deref()),
            Command::Custom { name, args } => {
                if let Some(handler) = self.handlers.get(name) {
                    handler.execute(&mut ctx, args)
                } else {
                    Err(crate::CoreError::CommandNotFound(name.clone()))
                }
            }
        }
    }

    /// Returns all registered command names.
    pub fn list(&self) -> Vec<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
