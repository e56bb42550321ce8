// crates/sync-engine/src/remote.rs
//! Remote document store interface

use livepatch_core::Document;
use thiserror::Error;

/// Result type for remote store operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors reported by a remote document store
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The store could not be reached
    #[error("Remote store unreachable: {0}")]
    Unreachable(String),

    /// The store rejected the operation
    #[error("Remote store rejected the operation: {0}")]
    Rejected(String),
}

/// Receives change-stream notifications for one subscription
///
/// `changed(None)` means the resource exists but holds no document yet.
pub trait RemoteObserver: Send + Sync {
    /// Normal path: a new document state was delivered
    fn changed(&self, document: Option<Document>);

    /// Error path: the stream failed
    fn failed(&self, error: RemoteError);
}

/// Replicated document store addressed by resource id
///
/// Implementations replace whole documents; there is no partial-update
/// operation. An instance is constructed by the composition root and passed
/// in explicitly.
pub trait RemoteDocumentStore: Send + Sync {
    /// Subscribes to the change stream of a resource
    ///
    /// The observer may be invoked before this call returns (the current
    /// state is delivered immediately when the store is reachable). The
    /// returned handle cancels the stream; after cancellation no further
    /// notifications may be delivered.
    fn subscribe(
        &self,
        resource_id: &str,
        observer: std::sync::Arc<dyn RemoteObserver>,
    ) -> RemoteResult<Subscription>;

    /// Replaces the whole document stored under a resource id
    fn write_whole(&self, resource_id: &str, document: &Document) -> RemoteResult<()>;

    /// Creates a new resource with a generated id, returning the id
    fn create_with_generated_id(&self, document: &Document) -> RemoteResult<String>;
}

/// Cancellation handle for an active change-stream subscription
///
/// Cancels on drop, mirroring the subscribe-in-effect / unsubscribe-on-
/// teardown lifecycle of the consuming layer.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wraps a cancellation action
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancels the subscription explicitly
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
