//! Snapshot cache for the latest known document per resource

use crate::keys::snapshot_key;
use crate::store::LocalStore;
use livepatch_core::Document;
use std::sync::Arc;

/// Caches the latest known full document state per resource id
///
/// This is a best-effort cache, not a durability guarantee: `save` never
/// propagates a failure, and on `load` corrupt data is treated identically
/// to absent data.
#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn LocalStore>,
}

impl SnapshotStore {
    /// Creates a snapshot store on top of a key-value store
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Persists the latest snapshot for a resource, swallowing failures
    pub fn save(&self, resource_id: &str, document: &Document) {
        let json = match serde_json::to_string(document) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize snapshot for {resource_id}: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(&snapshot_key(resource_id), &json) {
            log::warn!("Failed to save snapshot for {resource_id}: {e}");
        }
    }

    /// Loads the last saved snapshot, or `None` if absent or unparseable
    pub fn load(&self, resource_id: &str) -> Option<Document> {
        let raw = self.store.get(&snapshot_key(resource_id))?;
        match serde_json::from_str(&raw) {
            Ok(document) => Some(document),
            Err(e) => {
                log::warn!("Discarding unparseable snapshot for {resource_id}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn snapshot_store() -> (MemoryStore, SnapshotStore) {
        let store = MemoryStore::new();
        let snapshots = SnapshotStore::new(Arc::new(store.clone()));
        (store, snapshots)
    }

    #[test]
    fn test_save_then_load() {
        let (_, snapshots) = snapshot_store();
        let mut doc = Document::titled("Cached");
        doc.set_cell(1, 1, "value", None);

        snapshots.save("res-1", &doc);
        let loaded = snapshots.load("res-1").unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_load_missing_is_none() {
        let (_, snapshots) = snapshot_store();
        assert!(snapshots.load("nope").is_none());
    }

    #[test]
    fn test_corrupt_snapshot_reads_as_absent() {
        let (store, snapshots) = snapshot_store();
        store.set(&snapshot_key("res-1"), "{not json").unwrap();
        assert!(snapshots.load("res-1").is_none());
    }

    #[test]
    fn test_snapshots_are_keyed_per_resource() {
        let (_, snapshots) = snapshot_store();
        snapshots.save("a", &Document::titled("A"));
        snapshots.save("b", &Document::titled("B"));

        assert_eq!(snapshots.load("a").unwrap().metadata.title, "A");
        assert_eq!(snapshots.load("b").unwrap().metadata.title, "B");
    }
}
