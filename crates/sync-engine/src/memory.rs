// crates/sync-engine/src/memory.rs
//! In-memory remote document store
//!
//! Reference implementation of [`RemoteDocumentStore`] backed by process
//! memory. Used by the integration tests and the demo; availability can be
//! switched off to exercise the offline paths.

use crate::remote::{
    RemoteDocumentStore, RemoteError, RemoteObserver, RemoteResult, Subscription,
};
use livepatch_core::Document;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

struct Subscriber {
    token: u64,
    observer: Arc<dyn RemoteObserver>,
}

struct Shared {
    documents: HashMap<String, Document>,
    subscribers: HashMap<String, Vec<Subscriber>>,
    available: bool,
    next_token: u64,
    write_calls: usize,
}

/// In-memory replicated document store
///
/// Writes notify every subscriber of the resource, including the writer
/// itself, mirroring the echo behavior of a real change stream. While
/// unavailable, writes and new subscriptions fail; existing subscribers
/// only notice through their own failed calls. Restoring availability
/// redelivers the current state to every subscriber, like a reconnecting
/// stream.
#[derive(Clone)]
pub struct InMemoryRemoteStore {
    shared: Arc<Mutex<Shared>>,
}

impl InMemoryRemoteStore {
    /// Creates an empty, available store
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                documents: HashMap::new(),
                subscribers: HashMap::new(),
                available: true,
                next_token: 0,
                write_calls: 0,
            })),
        }
    }

    /// Switches store availability
    ///
    /// Coming back up redelivers the current document state to every
    /// subscriber.
    pub fn set_available(&self, available: bool) {
        let redeliveries = {
            let Ok(mut shared) = self.shared.lock() else { return };
            if shared.available == available {
                return;
            }
            shared.available = available;
            if !available {
                Vec::new()
            } else {
                shared
                    .subscribers
                    .iter()
                    .flat_map(|(resource_id, subscribers)| {
                        let document = shared.documents.get(resource_id).cloned();
                        subscribers
                            .iter()
                            .map(move |s| (s.observer.clone(), document.clone()))
                    })
                    .collect()
            }
        };
        for (observer, document) in redeliveries {
            observer.changed(document);
        }
    }

    /// Number of whole-document writes accepted so far
    pub fn write_calls(&self) -> usize {
        self.shared.lock().map(|s| s.write_calls).unwrap_or(0)
    }

    /// Returns the stored document for a resource, if any
    pub fn document(&self, resource_id: &str) -> Option<Document> {
        self.shared
            .lock()
            .ok()?
            .documents
            .get(resource_id)
            .cloned()
    }

    /// Number of active subscribers for a resource
    pub fn subscriber_count(&self, resource_id: &str) -> usize {
        self.shared
            .lock()
            .map(|s| s.subscribers.get(resource_id).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteDocumentStore for InMemoryRemoteStore {
    fn subscribe(
        &self,
        resource_id: &str,
        observer: Arc<dyn RemoteObserver>,
    ) -> RemoteResult<Subscription> {
        let (subscription, available, current) = {
            let mut shared = self
                .shared
                .lock()
                .map_err(|_| RemoteError::Rejected("store lock poisoned".to_string()))?;
            let token = shared.next_token;
            shared.next_token += 1;
            shared
                .subscribers
                .entry(resource_id.to_string())
                .or_default()
                .push(Subscriber {
                    token,
                    observer: observer.clone(),
                });

            let shared_handle = self.shared.clone();
            let cancel_resource = resource_id.to_string();
            let subscription = Subscription::new(move || {
                if let Ok(mut shared) = shared_handle.lock() {
                    if let Some(subscribers) = shared.subscribers.get_mut(&cancel_resource) {
                        subscribers.retain(|s| s.token != token);
                    }
                }
            });

            let current = shared.documents.get(resource_id).cloned();
            (subscription, shared.available, current)
        };

        // Initial notification is delivered outside the lock: the observer
        // may call straight back into the store
        if available {
            observer.changed(current);
        } else {
            observer.failed(RemoteError::Unreachable("store offline".to_string()));
        }
        Ok(subscription)
    }

    fn write_whole(&self, resource_id: &str, document: &Document) -> RemoteResult<()> {
        let observers = {
            let mut shared = self
                .shared
                .lock()
                .map_err(|_| RemoteError::Rejected("store lock poisoned".to_string()))?;
            if !shared.available {
                return Err(RemoteError::Unreachable("store offline".to_string()));
            }
            shared.write_calls += 1;
            shared
                .documents
                .insert(resource_id.to_string(), document.clone());
            shared
                .subscribers
                .get(resource_id)
                .map(|subscribers| {
                    subscribers
                        .iter()
                        .map(|s| s.observer.clone())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };
        for observer in observers {
            observer.changed(Some(document.clone()));
        }
        Ok(())
    }

    fn create_with_generated_id(&self, document: &Document) -> RemoteResult<String> {
        let mut shared = self
            .shared
            .lock()
            .map_err(|_| RemoteError::Rejected("store lock poisoned".to_string()))?;
        if !shared.available {
            return Err(RemoteError::Unreachable("store offline".to_string()));
        }
        let resource_id = Uuid::new_v4().to_string();
        shared
            .documents
            .insert(resource_id.clone(), document.clone());
        Ok(resource_id)
    }
}
