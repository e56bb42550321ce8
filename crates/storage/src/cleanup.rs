//! Removal of stale cached entries
//!
//! Cached snapshots and queues for resources the user has not touched in a
//! month only take up space; they are rebuilt from the remote store on the
//! next visit anyway.

use crate::keys::{is_tracked_key, QUEUE_PREFIX};
use crate::store::LocalStore;
use chrono::{DateTime, Duration, Utc};

/// Entries untouched for this many days are removed
pub const MAX_ENTRY_AGE_DAYS: i64 = 30;

/// Removes stale and unparseable tracked entries, returning how many went
///
/// A snapshot's age comes from `metadata.lastModified`, a queue's from its
/// last entry's `enqueuedAt`. Entries that fail to parse are removed too;
/// entries without a readable timestamp are kept.
pub fn cleanup_stale(store: &dyn LocalStore, now: DateTime<Utc>) -> usize {
    let cutoff = now - Duration::days(MAX_ENTRY_AGE_DAYS);
    let mut removed = 0;

    for key in store.keys() {
        if !is_tracked_key(&key) {
            continue;
        }
        let Some(raw) = store.get(&key) else { continue };
        match entry_timestamp(&key, &raw) {
            ParsedAge::Stamped(at) if at < cutoff => {
                store.remove(&key);
                removed += 1;
            }
            ParsedAge::Stamped(_) | ParsedAge::Unstamped => {}
            ParsedAge::Unparseable => {
                store.remove(&key);
                removed += 1;
            }
        }
    }

    if removed > 0 {
        log::info!("Cleaned up {removed} stale local entries");
    }
    removed
}

enum ParsedAge {
    Stamped(DateTime<Utc>),
    Unstamped,
    Unparseable,
}

fn entry_timestamp(key: &str, raw: &str) -> ParsedAge {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
        return ParsedAge::Unparseable;
    };
    let stamp = if key.starts_with(QUEUE_PREFIX) {
        value
            .as_array()
            .and_then(|entries| entries.last())
            .and_then(|entry| entry.get("enqueuedAt"))
            .and_then(|at| at.as_str())
            .map(str::to_owned)
    } else {
        value
            .pointer("/metadata/lastModified")
            .and_then(|at| at.as_str())
            .map(str::to_owned)
    };
    match stamp {
        Some(stamp) => match DateTime::parse_from_rfc3339(&stamp) {
            Ok(at) => ParsedAge::Stamped(at.with_timezone(&Utc)),
            Err(_) => ParsedAge::Unparseable,
        },
        None => ParsedAge::Unstamped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{queue_key, snapshot_key};
    use crate::snapshot::SnapshotStore;
    use crate::store::MemoryStore;
    use livepatch_core::Document;
    use std::sync::Arc;

    fn aged_snapshot(days_old: i64) -> String {
        let mut doc = Document::titled("Old");
        doc.metadata.last_modified = Utc::now() - Duration::days(days_old);
        serde_json::to_string(&doc).unwrap()
    }

    #[test]
    fn test_removes_old_snapshot_keeps_fresh() {
        let store = MemoryStore::new();
        store.set(&snapshot_key("old"), &aged_snapshot(40)).unwrap();
        store.set(&snapshot_key("fresh"), &aged_snapshot(2)).unwrap();

        let removed = cleanup_stale(&store, Utc::now());

        assert_eq!(removed, 1);
        assert!(store.get(&snapshot_key("old")).is_none());
        assert!(store.get(&snapshot_key("fresh")).is_some());
    }

    #[test]
    fn test_removes_unparseable_entries() {
        let store = MemoryStore::new();
        store.set(&snapshot_key("bad"), "{truncated").unwrap();

        assert_eq!(cleanup_stale(&store, Utc::now()), 1);
        assert!(store.get(&snapshot_key("bad")).is_none());
    }

    #[test]
    fn test_queue_age_comes_from_last_entry() {
        let store = MemoryStore::new();
        let old = (Utc::now() - Duration::days(45)).to_rfc3339();
        let queue = format!(r#"[{{"enqueuedAt":"{old}","document":{{}}}}]"#);
        store.set(&queue_key("dormant"), &queue).unwrap();

        assert_eq!(cleanup_stale(&store, Utc::now()), 1);
        assert!(store.get(&queue_key("dormant")).is_none());
    }

    #[test]
    fn test_untracked_and_unstamped_keys_survive() {
        let store = MemoryStore::new();
        store.set("some-other-feature", "{bad json").unwrap();
        store.set(&queue_key("empty"), "[]").unwrap();

        assert_eq!(cleanup_stale(&store, Utc::now()), 0);
        assert!(store.get("some-other-feature").is_some());
        assert!(store.get(&queue_key("empty")).is_some());
    }

    #[test]
    fn test_snapshot_store_output_survives_cleanup() {
        let store = MemoryStore::new();
        let snapshots = SnapshotStore::new(Arc::new(store.clone()));
        snapshots.save("live", &Document::titled("Live"));

        assert_eq!(cleanup_stale(&store, Utc::now()), 0);
        assert!(snapshots.load("live").is_some());
    }
}
