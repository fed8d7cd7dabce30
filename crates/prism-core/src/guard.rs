//! Re-entrancy guard for highlight passes.
//!
//! ## Learning: RAII
//!
//! `PassGuard::enter` hands back a `PassToken`. The document stays marked
//! as "in a pass" for exactly as long as the token lives; `Drop` clears the
//! mark on every exit path, including `?` early returns and unwinding
//! panics. There is no `leave()` to forget to call.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::document::DocumentId;

/// Set of documents that currently have a highlight pass running.
///
/// Cloning shares the set, so a listener installed on a decoration layer
/// can hold its own copy and ask whether the change it sees came from a
/// pass.
#[derive(Debug, Clone, Default)]
pub struct PassGuard {
    active: Arc<Mutex<HashSet<DocumentId>>>,
}

impl PassGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as in a pass. Returns `None` if it already is.
    pub fn enter(&self, id: DocumentId) -> Option<PassToken> {
        if self.lock().insert(id) {
            Some(PassToken {
                guard: self.clone(),
                id,
            })
        } else {
            None
        }
    }

    /// Returns true while a pass for `id` is running.
    pub fn is_active(&self, id: DocumentId) -> bool {
        self.lock().contains(&id)
    }

    // A panic inside a pass must not disable the guard for good.
    fn lock(&self) -> MutexGuard<'_, HashSet<DocumentId>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Proof that a pass is running; releases the document on drop.
#[derive(Debug)]
pub struct PassToken {
    guard: PassGuard,
    id: DocumentId,
}

impl PassToken {
    pub fn id(&self) -> DocumentId {
        self.id
    }
}

impl Drop for PassToken {
    fn drop(&mut self) {
        self.guard.lock().remove(&self.id);
    }
}
