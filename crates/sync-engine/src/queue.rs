// crates/sync-engine/src/queue.rs
//! Pending-write queue

use chrono::{DateTime, Utc};
use livepatch_core::Document;
use livepatch_storage::{queue_key, LocalStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One queued write: a full-document snapshot, never a delta
///
/// Because every snapshot already contains all edits made before it was
/// enqueued, replaying only the last entry is sufficient at drain time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    /// When the entry was appended
    pub enqueued_at: DateTime<Utc>,
    /// Full document state at that moment
    pub document: Document,
}

/// Ordered log of writes not yet confirmed persisted remotely
///
/// Entries are appended in call order and only removed by a drain. The
/// queue mirrors itself into the local store after every mutation so it
/// survives the process; persistence failures are logged and swallowed.
pub struct PendingWriteQueue {
    resource_id: String,
    store: Arc<dyn LocalStore>,
    entries: Vec<QueueEntry>,
}

impl PendingWriteQueue {
    /// Loads the persisted queue for a resource, or starts empty
    pub fn load(resource_id: impl Into<String>, store: Arc<dyn LocalStore>) -> Self {
        let resource_id = resource_id.into();
        let entries = store
            .get(&queue_key(&resource_id))
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    log::warn!("Discarding unparseable queue for {resource_id}: {e}");
                    None
                }
            })
            .unwrap_or_default();
        Self {
            resource_id,
            store,
            entries,
        }
    }

    /// Appends a snapshot; no deduplication or coalescing happens here
    pub fn push(&mut self, document: Document) {
        let entry = QueueEntry {
            enqueued_at: Utc::now(),
            document,
        };
        log::info!(
            "Queued change for {} at {}",
            self.resource_id,
            entry.enqueued_at
        );
        self.entries.push(entry);
        self.persist();
    }

    /// Number of pending entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent entry, the one a drain writes
    pub fn last(&self) -> Option<&QueueEntry> {
        self.entries.last()
    }

    /// Removes the oldest `count` entries after a successful drain
    ///
    /// Entries appended after the drain snapshot was taken stay queued.
    pub fn remove_first(&mut self, count: usize) {
        let count = count.min(self.entries.len());
        self.entries.drain(..count);
        self.persist();
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize queue for {}: {e}", self.resource_id);
                return;
            }
        };
        if let Err(e) = self.store.set(&queue_key(&self.resource_id), &json) {
            log::warn!("Failed to save queue for {}: {e}", self.resource_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepatch_storage::MemoryStore;

    fn queue_over(store: &MemoryStore) -> PendingWriteQueue {
        PendingWriteQueue::load("res-1", Arc::new(store.clone()))
    }

    #[test]
    fn test_push_appends_in_order() {
        let store = MemoryStore::new();
        let mut queue = queue_over(&store);

        queue.push(Document::titled("D1"));
        queue.push(Document::titled("D2"));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.last().unwrap().document.metadata.title, "D2");
    }

    #[test]
    fn test_queue_survives_reload() {
        let store = MemoryStore::new();
        {
            let mut queue = queue_over(&store);
            queue.push(Document::titled("Persisted"));
        }

        let reloaded = queue_over(&store);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(
            reloaded.last().unwrap().document.metadata.title,
            "Persisted"
        );
    }

    #[test]
    fn test_remove_first_keeps_later_entries() {
        let store = MemoryStore::new();
        let mut queue = queue_over(&store);
        queue.push(Document::titled("old-1"));
        queue.push(Document::titled("old-2"));
        queue.push(Document::titled("mid-flight"));

        queue.remove_first(2);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.last().unwrap().document.metadata.title, "mid-flight");
    }

    #[test]
    fn test_corrupt_persisted_queue_starts_empty() {
        let store = MemoryStore::new();
        store.set(&queue_key("res-1"), "[{broken").unwrap();

        let queue = queue_over(&store);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_serialized_entry_layout() {
        let store = MemoryStore::new();
        let mut queue = queue_over(&store);
        queue.push(Document::titled("Layout"));

        let raw = store.get(&queue_key("res-1")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value[0]["enqueuedAt"].is_string());
        assert_eq!(value[0]["document"]["metadata"]["title"], "Layout");
    }
}
