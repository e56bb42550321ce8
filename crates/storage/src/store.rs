//! Synchronous key-value store implementations

use crate::error::{StorageError, StorageResult};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Synchronous string key-value store
///
/// Reads are best-effort: a failed read behaves like an absent key. Writes
/// surface their error so the caller can decide whether to log-and-swallow.
pub trait LocalStore: Send + Sync {
    /// Returns the stored value, or `None` if absent or unreadable
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value under a key
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes a key; absent keys are ignored
    fn remove(&self, key: &str);

    /// Enumerates all stored keys
    fn keys(&self) -> Vec<String>;
}

/// In-memory store, also the test double
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// File-backed store, one file per key under a root directory
///
/// Writes go through a temporary file and an atomic rename, so a crash
/// mid-write never leaves a truncated entry behind.
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at the given directory, creating it if needed
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| StorageError::Write {
            path: root.clone(),
            source: e,
        })?;
        Ok(Self { root })
    }

    /// Returns the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys in our layout are already safe file names; anything else is
        // mapped onto the safe alphabet
        let mut name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if name.is_empty() || name.chars().all(|c| c == '.') {
            name = format!("_{name}");
        }
        self.root.join(name)
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.root).map_err(|e| StorageError::Write {
            path: path.clone(),
            source: e,
        })?;
        tmp.write_all(value.as_bytes())
            .map_err(|e| StorageError::Write {
                path: path.clone(),
                source: e,
            })?;
        tmp.persist(&path).map_err(|e| StorageError::Write {
            path,
            source: e.error,
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to list {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get("k").is_none());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));

        store.remove("k");
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.set("shared", "yes").unwrap();
        assert_eq!(clone.get("shared").as_deref(), Some("yes"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.set("livepatch-spreadsheet-a", "{}").unwrap();
        assert_eq!(store.get("livepatch-spreadsheet-a").as_deref(), Some("{}"));
        assert_eq!(store.keys(), vec!["livepatch-spreadsheet-a".to_string()]);

        store.remove("livepatch-spreadsheet-a");
        assert!(store.get("livepatch-spreadsheet-a").is_none());
    }

    #[test]
    fn test_file_store_overwrites_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("second"));
        // The temp file used for the write must not linger
        assert_eq!(store.keys().len(), 1);
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.set("../escape", "v").unwrap();
        assert_eq!(store.get("../escape").as_deref(), Some("v"));
        // Nothing may be written outside the root
        assert!(dir.path().parent().unwrap().join("escape").metadata().is_err());
    }

    #[test]
    fn test_missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(store.get("never-written").is_none());
    }
}
