// crates/sync-engine/src/lib.rs
//! Offline-first synchronization engine
//!
//! This module keeps a spreadsheet document in sync with a remote document
//! store while surviving connectivity loss:
//! - Every local edit is cached synchronously before any network activity
//! - Edits made while disconnected accumulate in an ordered pending-write
//!   queue, persisted locally
//! - When connectivity returns, the queue drains by writing the most
//!   recent snapshot (last-write-wins, whole-document replacement)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use livepatch_storage::MemoryStore;
//! use livepatch_sync_engine::{InMemoryRemoteStore, NullObserver, SyncConfig, SyncEngine};
//!
//! let remote = Arc::new(InMemoryRemoteStore::new());
//! let engine = SyncEngine::new(
//!     SyncConfig::default(),
//!     remote.clone(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(NullObserver),
//! );
//!
//! let id = engine.create_resource("Festival Lineup").unwrap();
//! engine.bind(&id).unwrap();
//!
//! let mut doc = engine.document().unwrap();
//! doc.set_cell(0, 0, "Headliner", None);
//! engine.apply_edit(doc).unwrap();
//! ```

mod connectivity;
mod engine;
mod error;
mod memory;
mod observer;
mod queue;
mod remote;

pub use connectivity::{ConnectivityEvent, ConnectivityMonitor};
pub use engine::{EngineState, SyncConfig, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use memory::InMemoryRemoteStore;
pub use observer::{NullObserver, SyncObserver};
pub use queue::{PendingWriteQueue, QueueEntry};
pub use remote::{
    RemoteDocumentStore, RemoteError, RemoteObserver, RemoteResult, Subscription,
};

#[cfg(test)]
mod tests {
    use super::*;
    use livepatch_storage::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_all_exports_accessible() {
        // Verify all types are exported
        let _: ConnectivityMonitor = ConnectivityMonitor::new();
        let _: SyncConfig = SyncConfig::default();
        let _: SyncEngine = SyncEngine::new(
            SyncConfig::default(),
            Arc::new(InMemoryRemoteStore::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(NullObserver),
        );
    }
}
