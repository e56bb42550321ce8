//! Key layout for locally cached entries
//!
//! One snapshot entry and one queue entry exist per resource id, each
//! independently keyed. The prefixes match previously cached data.

/// Key prefix for document snapshots
pub const SNAPSHOT_PREFIX: &str = "livepatch-spreadsheet-";
/// Key prefix for pending-write queues
pub const QUEUE_PREFIX: &str = "livepatch-sync-queue-";

/// Returns the snapshot key for a resource id
pub fn snapshot_key(resource_id: &str) -> String {
    format!("{SNAPSHOT_PREFIX}{resource_id}")
}

/// Returns the pending-write queue key for a resource id
pub fn queue_key(resource_id: &str) -> String {
    format!("{QUEUE_PREFIX}{resource_id}")
}

/// Returns true for keys owned by this crate's layout
pub fn is_tracked_key(key: &str) -> bool {
    key.starts_with(SNAPSHOT_PREFIX) || key.starts_with(QUEUE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(snapshot_key("abc"), "livepatch-spreadsheet-abc");
        assert_eq!(queue_key("abc"), "livepatch-sync-queue-abc");
    }

    #[test]
    fn test_tracked_keys() {
        assert!(is_tracked_key(&snapshot_key("x")));
        assert!(is_tracked_key(&queue_key("x")));
        assert!(!is_tracked_key("unrelated-key"));
    }
}
