//! Document management.
//!
//! ## Learning: Newtypes
//!
//! `DocumentId` wraps a `Uuid`. The highlight manager keys all of its
//! per-document state by this id, so the type system guarantees that a
//! random string or index can never be used to look a document up.

use prism_buffer::{TextBuffer, TextChange};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new unique document ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An open document: text plus what we know about its type.
pub struct Document {
    /// Unique identifier
    id: DocumentId,

    /// The underlying text buffer
    buffer: TextBuffer,

    /// File path (None for untitled documents)
    path: Option<PathBuf>,

    /// Display name
    name: String,

    /// Document language (for span classification)
    language: Option<String>,

    /// Whether the file content looked binary when opened
    binary: bool,
}

impl Document {
    /// Creates an untitled document from text.
    pub fn new(text: &str) -> Self {
        Self {
            id: DocumentId::new(),
            buffer: TextBuffer::from(text),
            path: None,
            name: "Untitled".to_string(),
            language: None,
            binary: false,
        }
    }

    /// Sets the language explicitly.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Creates a document as if read from `path`, without touching disk.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.name = file_name(path);
        if self.language.is_none() {
            self.language = detect_language(path);
        }
        self.path = Some(path.to_path_buf());
        self
    }

    /// Opens a document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::FileNotFound(path.display().to_string()),
            _ => CoreError::Io(e),
        })?;
        let binary = TextBuffer::looks_binary(&bytes);
        let buffer = TextBuffer::from(String::from_utf8_lossy(&bytes).into_owned());

        Ok(Self {
            id: DocumentId::new(),
            buffer,
            path: Some(path.to_path_buf()),
            name: file_name(path),
            language: detect_language(path),
            binary,
        })
    }

    // ==================== Getters ====================

    /// Returns the document ID.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the detected language.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// File type name used for exclusion checks: the language if known,
    /// else the raw extension, else `"text"`.
    pub fn file_type(&self) -> Cow<'_, str> {
        if let Some(lang) = &self.language {
            return Cow::Borrowed(lang);
        }
        self.path
            .as_deref()
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|e| Cow::Owned(e.to_lowercase()))
            .unwrap_or(Cow::Borrowed("text"))
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Marks the document as binary (or not), e.g. from host metadata.
    pub fn set_binary(&mut self, binary: bool) {
        self.binary = binary;
    }

    /// Returns the text buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Returns all text.
    pub fn text(&self) -> Cow<'_, str> {
        self.buffer.text()
    }

    // ==================== Editing ====================

    /// Replaces `range` with `text` and reports the change.
    pub fn edit(&mut self, range: Range<usize>, text: &str) -> CoreResult<TextChange> {
        let change = if range.is_empty() {
            self.buffer.insert(range.start, text)?
        } else if text.is_empty() {
            self.buffer.delete(range)?
        } else {
            self.buffer.replace(range, text)?
        };
        Ok(change)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("Unknown")
        .to_string()
}

fn detect_language(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(language_from_extension)
}

/// Detects language from file extension.
fn language_from_extension(ext: &str) -> String {
    let ext = ext.to_lowercase();
    match ext.as_str() {
        "rs" => "rust",
        "py" | "pyi" => "python",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "html" | "htm" => "html",
        "css" => "css",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "md" | "markdown" => "markdown",
        "c" | "h" => "c",
        "cpp" | "hpp" | "cc" | "cxx" => "cpp",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "rb" => "ruby",
        "sh" | "bash" | "zsh" => "bash",
        "txt" => "text",
        other => other,
    }
    .to_string()
}

/// Manages open documents.
pub struct DocumentManager {
    /// All open documents
    documents: HashMap<DocumentId, Document>,

    /// Order in which documents were opened
    order: Vec<DocumentId>,
}

impl DocumentManager {
    /// Creates a new document manager.
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Adds a document.
    pub fn add(&mut self, doc: Document) -> DocumentId {
        let id = doc.id();
        self.documents.insert(id, doc);
        self.order.push(id);
        id
    }

    /// Removes a document.
    pub fn close(&mut self, id: DocumentId) -> CoreResult<Document> {
        let doc = self
            .documents
            .remove(&id)
            .ok_or(CoreError::DocumentNotFound(id))?;
        self.order.retain(|&i| i != id);
        Ok(doc)
    }

    /// Returns a document by ID.
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Returns a mutable document by ID.
    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    /// Finds a document by path.
    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        self.documents
            .iter()
            .find(|(_, doc)| doc.path() == Some(path))
            .map(|(&id, _)| id)
    }

    /// Returns an iterator over all documents.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.order.iter().filter_map(|id| self.documents.get(id))
    }

    /// Returns the document ids in open order.
    pub fn order(&self) -> &[DocumentId] {
        &self.order
    }

    /// Returns the number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for DocumentManager {
    fn default() -> Self {
        Self::new()
    }
}
