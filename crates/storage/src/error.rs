//! Error types for local persistence

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in the local store
///
/// Callers above the [`crate::LocalStore`] layer treat every variant as a
/// cache miss: failures are logged and swallowed, never propagated.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to read a stored entry
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write an entry
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store mutex poisoned
    #[error("Store lock poisoned")]
    LockPoisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::Write {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert!(err.to_string().contains("Failed to write"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_lock_poisoned_display() {
        assert!(StorageError::LockPoisoned.to_string().contains("poisoned"));
    }
}
