//! Best-effort local persistence for Livepatch
//!
//! This crate provides the client-side cache layer:
//! - A synchronous string key-value abstraction ([`LocalStore`]) with
//!   in-memory and atomic file-backed implementations
//! - The snapshot store, which caches the latest known document per
//!   resource id ([`SnapshotStore`])
//! - The shared key layout for snapshot and sync-queue entries
//! - Cleanup of stale cached entries
//!
//! Nothing here is a durability guarantee: writes are best-effort, and
//! corrupt data is indistinguishable from absent data on read.

mod cleanup;
mod error;
mod keys;
mod snapshot;
mod store;

pub use cleanup::{cleanup_stale, MAX_ENTRY_AGE_DAYS};
pub use error::{StorageError, StorageResult};
pub use keys::{is_tracked_key, queue_key, snapshot_key, QUEUE_PREFIX, SNAPSHOT_PREFIX};
pub use snapshot::SnapshotStore;
pub use store::{FileStore, LocalStore, MemoryStore};
