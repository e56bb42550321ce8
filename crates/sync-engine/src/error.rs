// crates/sync-engine/src/error.rs
//! Error types for sync operations

use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during synchronization
///
/// Remote unavailability is handled internally by demoting connectivity and
/// queuing, so the variants here are the ones that reach callers.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote store could not be reached
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// Creating a new resource failed; there is no local fallback for this
    #[error("Failed to create resource: {0}")]
    CreateFailed(String),

    /// Engine is not bound to a resource
    #[error("Engine is not bound to a resource")]
    NotBound,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Engine state lock poisoned
    #[error("Engine lock poisoned")]
    LockPoisoned,
}
