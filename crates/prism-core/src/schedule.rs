//! Deferred rescans.
//!
//! Edits don't rescan inline: they push the document here and the editor
//! drains the queue later. Pushing a document that is already waiting is a
//! no-op, so a burst of keystrokes costs one scan.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::document::DocumentId;

#[derive(Debug, Default)]
struct Pending {
    order: VecDeque<DocumentId>,
    queued: HashSet<DocumentId>,
}

/// FIFO of documents waiting for a rescan, deduplicated per document.
#[derive(Debug, Clone, Default)]
pub struct RescanQueue {
    inner: Arc<Mutex<Pending>>,
}

impl RescanQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `id`. Returns false if it was already queued.
    pub fn push(&self, id: DocumentId) -> bool {
        let mut pending = self.lock();
        if pending.queued.insert(id) {
            pending.order.push_back(id);
            true
        } else {
            false
        }
    }

    /// Takes the oldest queued document.
    pub fn pop(&self) -> Option<DocumentId> {
        let mut pending = self.lock();
        let id = pending.order.pop_front()?;
        pending.queued.remove(&id);
        Some(id)
    }

    /// Drops `id` from the queue, e.g. when its document closes.
    pub fn remove(&self, id: DocumentId) {
        let mut pending = self.lock();
        if pending.queued.remove(&id) {
            pending.order.retain(|&queued| queued != id);
        }
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.lock().queued.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().order.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_with_dedup() {
        let queue = RescanQueue::new();
        let a = DocumentId::new();
        let b = DocumentId::new();

        assert!(queue.push(a));
        assert!(queue.push(b));
        assert!(!queue.push(a));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop(), Some(a));
        assert!(queue.push(a));
        assert_eq!(queue.pop(), Some(b));
        assert_eq!(queue.pop(), Some(a));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_remove() {
        let queue = RescanQueue::new();
        let a = DocumentId::new();
        let b = DocumentId::new();
        queue.push(a);
        queue.push(b);

        queue.remove(a);
        assert!(!queue.contains(a));
        assert_eq!(queue.pop(), Some(b));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let queue = RescanQueue::new();
        let other = queue.clone();
        let id = DocumentId::new();
        other.push(id);
        assert_eq!(queue.pop(), Some(id));
    }
}
