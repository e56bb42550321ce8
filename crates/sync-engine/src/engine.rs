// crates/sync-engine/src/engine.rs
//! Main sync engine

use crate::connectivity::ConnectivityMonitor;
use crate::error::{SyncError, SyncResult};
use crate::observer::SyncObserver;
use crate::queue::PendingWriteQueue;
use crate::remote::{RemoteDocumentStore, RemoteError, RemoteObserver, Subscription};
use livepatch_core::{Document, DEFAULT_TITLE};
use livepatch_storage::{LocalStore, SnapshotStore};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Whether to drain the queue automatically when connectivity returns
    pub auto_drain: bool,
    /// Title given to documents synthesized from the default template
    pub template_title: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_drain: true,
            template_title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Lifecycle state of the engine for the bound resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Waiting for the first change-stream notification
    Initializing,
    /// Live against the remote store
    Connected,
    /// Working offline; edits accumulate in the queue
    Disconnected,
    /// A drain is in flight
    Syncing,
}

/// Offline-first synchronization engine
///
/// Owns the pending-write queue and the connectivity flags for one bound
/// resource at a time. Every local edit is cached synchronously before any
/// remote activity; reconnecting replays the most recent queued snapshot
/// (last-write-wins).
#[derive(Clone)]
pub struct SyncEngine {
    shared: Arc<EngineShared>,
}

struct EngineShared {
    config: SyncConfig,
    remote: Arc<dyn RemoteDocumentStore>,
    local: Arc<dyn LocalStore>,
    snapshots: SnapshotStore,
    observer: Arc<dyn SyncObserver>,
    inner: Mutex<Inner>,
}

struct Inner {
    state: EngineState,
    monitor: ConnectivityMonitor,
    /// Bumped on every bind/unbind; notifications from older streams are
    /// rejected against it
    generation: u64,
    binding: Option<Binding>,
}

struct Binding {
    resource_id: String,
    document: Option<Document>,
    queue: PendingWriteQueue,
    subscription: Option<Subscription>,
}

/// Change-stream callbacks for the currently bound resource
struct StreamObserver {
    shared: Weak<EngineShared>,
    generation: u64,
}

impl RemoteObserver for StreamObserver {
    fn changed(&self, document: Option<Document>) {
        if let Some(shared) = self.shared.upgrade() {
            EngineShared::on_remote_change(&shared, self.generation, document);
        }
    }

    fn failed(&self, error: RemoteError) {
        if let Some(shared) = self.shared.upgrade() {
            EngineShared::on_remote_failure(&shared, self.generation, error);
        }
    }
}

impl SyncEngine {
    /// Creates a new sync engine
    ///
    /// The remote store, local store and observer are injected by the
    /// composition root; the engine owns no global state.
    pub fn new(
        config: SyncConfig,
        remote: Arc<dyn RemoteDocumentStore>,
        local: Arc<dyn LocalStore>,
        observer: Arc<dyn SyncObserver>,
    ) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                config,
                remote,
                snapshots: SnapshotStore::new(local.clone()),
                local,
                observer,
                inner: Mutex::new(Inner {
                    state: EngineState::Initializing,
                    monitor: ConnectivityMonitor::new(),
                    generation: 0,
                    binding: None,
                }),
            }),
        }
    }

    /// Binds the engine to a resource and subscribes to its change stream
    ///
    /// Any previous binding is torn down first. The cached snapshot and
    /// the persisted queue for the resource are adopted immediately; the
    /// stream's first notification decides between Connected and
    /// Disconnected.
    pub fn bind(&self, resource_id: &str) -> SyncResult<()> {
        let (generation, old_subscription, pending) = {
            let mut inner = self.lock()?;
            inner.generation += 1;
            let generation = inner.generation;
            let old_subscription = inner.binding.take().and_then(|b| b.subscription);
            let queue = PendingWriteQueue::load(resource_id, self.shared.local.clone());
            let pending = queue.len();
            let document = self.shared.snapshots.load(resource_id);
            inner.state = EngineState::Initializing;
            inner.binding = Some(Binding {
                resource_id: resource_id.to_string(),
                document,
                queue,
                subscription: None,
            });
            (generation, old_subscription, pending)
        };
        // Cancel the superseded stream outside the lock
        drop(old_subscription);
        self.shared.observer.queue_length_changed(pending);

        let stream = Arc::new(StreamObserver {
            shared: Arc::downgrade(&self.shared),
            generation,
        });
        match self.shared.remote.subscribe(resource_id, stream) {
            Ok(subscription) => {
                let mut inner = self.lock()?;
                if inner.generation == generation {
                    if let Some(binding) = inner.binding.as_mut() {
                        binding.subscription = Some(subscription);
                    }
                }
                // A stale subscription drops here and cancels itself
                Ok(())
            }
            Err(e) => {
                // Same outcome as the stream's error path: work offline
                EngineShared::on_remote_failure(&self.shared, generation, e);
                Ok(())
            }
        }
    }

    /// Unbinds from the current resource, cancelling its change stream
    ///
    /// In-flight notifications from the old stream are rejected from this
    /// point on.
    pub fn unbind(&self) -> SyncResult<()> {
        let binding = {
            let mut inner = self.lock()?;
            inner.generation += 1;
            inner.state = EngineState::Initializing;
            inner.binding.take()
        };
        drop(binding);
        Ok(())
    }

    /// Applies a local edit
    ///
    /// Stamps last-modified and caches the snapshot synchronously, then
    /// either writes through to the remote store (when connected) or
    /// appends to the pending-write queue. A failed write-through demotes
    /// connectivity and queues the edit.
    pub fn apply_edit(&self, document: Document) -> SyncResult<()> {
        let mut document = document;
        let (generation, write_target, queued_len) = {
            let mut inner = self.lock()?;
            let generation = inner.generation;
            let connected = inner.monitor.is_connected();
            let binding = inner.binding.as_mut().ok_or(SyncError::NotBound)?;
            document.touch();
            binding.document = Some(document.clone());
            // Local cache always comes first
            self.shared.snapshots.save(&binding.resource_id, &document);
            if connected {
                let target = (binding.resource_id.clone(), document);
                (generation, Some(target), None)
            } else {
                binding.queue.push(document);
                (generation, None, Some(binding.queue.len()))
            }
        };

        if let Some(pending) = queued_len {
            self.shared.observer.queue_length_changed(pending);
        }
        if let Some((resource_id, document)) = write_target {
            if let Err(e) = self.shared.remote.write_whole(&resource_id, &document) {
                log::error!("Remote write failed for {resource_id}: {e}");
                let (went_offline, pending) = {
                    let mut inner = self.lock()?;
                    if inner.generation != generation {
                        return Ok(());
                    }
                    let was = inner.monitor.is_connected();
                    inner.monitor.set_store_reachable(false);
                    let went_offline = was && !inner.monitor.is_connected();
                    inner.state = EngineState::Disconnected;
                    let binding = inner.binding.as_mut().ok_or(SyncError::NotBound)?;
                    binding.queue.push(document);
                    (went_offline, binding.queue.len())
                };
                if went_offline {
                    self.shared.observer.connectivity_changed(false);
                }
                self.shared.observer.queue_length_changed(pending);
            }
        }
        Ok(())
    }

    /// Feeds the platform's device connectivity signal
    ///
    /// Repeated identical signals are ignored. A rising aggregate edge
    /// with pending entries triggers a drain (unless auto-drain is off).
    pub fn set_device_online(&self, online: bool) -> SyncResult<()> {
        let (generation, event, edge, drain_needed) = {
            let mut inner = self.lock()?;
            let was = inner.monitor.is_connected();
            let event = inner.monitor.set_device_online(online);
            let now = inner.monitor.is_connected();
            let queue_empty = inner.binding.as_ref().map_or(true, |b| b.queue.is_empty());
            if was && !now {
                inner.state = EngineState::Disconnected;
            } else if !was && now && queue_empty {
                inner.state = EngineState::Connected;
            }
            let edge = if was != now { Some(now) } else { None };
            let drain_needed = !was && now && !queue_empty;
            (inner.generation, event, edge, drain_needed)
        };

        if let Some(event) = event {
            log::info!("Device connectivity: {event:?}");
        }
        if let Some(connected) = edge {
            self.shared.observer.connectivity_changed(connected);
        }
        if drain_needed && self.shared.config.auto_drain {
            EngineShared::drain(&self.shared, generation);
        }
        Ok(())
    }

    /// Drains the pending-write queue now
    ///
    /// This is what a rising connectivity edge triggers automatically;
    /// with auto-drain disabled it is the caller's entry point. Fails when
    /// the aggregate connectivity is down.
    pub fn sync_now(&self) -> SyncResult<()> {
        let (generation, connected) = {
            let inner = self.lock()?;
            (inner.generation, inner.monitor.is_connected())
        };
        if !connected {
            return Err(SyncError::RemoteUnavailable(
                "engine is offline".to_string(),
            ));
        }
        EngineShared::drain(&self.shared, generation);
        Ok(())
    }

    /// Creates a brand-new remote resource from the default template
    ///
    /// There is no local fallback for creation: a remote failure is
    /// surfaced to the caller. On success the template is cached locally
    /// under the generated id.
    pub fn create_resource(&self, title: &str) -> SyncResult<String> {
        let document = Document::titled(title.trim());
        match self.shared.remote.create_with_generated_id(&document) {
            Ok(resource_id) => {
                self.shared.snapshots.save(&resource_id, &document);
                log::info!("Created resource {resource_id}");
                Ok(resource_id)
            }
            Err(e) => Err(SyncError::CreateFailed(e.to_string())),
        }
    }

    /// Current engine state
    pub fn state(&self) -> EngineState {
        self.shared
            .inner
            .lock()
            .map(|inner| inner.state)
            .unwrap_or(EngineState::Disconnected)
    }

    /// Aggregate connectivity: device online and store reachable
    pub fn is_connected(&self) -> bool {
        self.shared
            .inner
            .lock()
            .map(|inner| inner.monitor.is_connected())
            .unwrap_or(false)
    }

    /// Number of pending queued writes
    pub fn queue_len(&self) -> usize {
        self.shared
            .inner
            .lock()
            .map(|inner| inner.binding.as_ref().map_or(0, |b| b.queue.len()))
            .unwrap_or(0)
    }

    /// The engine's current view of the bound document
    pub fn document(&self) -> Option<Document> {
        self.shared
            .inner
            .lock()
            .ok()?
            .binding
            .as_ref()
            .and_then(|b| b.document.clone())
    }

    /// The bound resource id, if any
    pub fn resource_id(&self) -> Option<String> {
        self.shared
            .inner
            .lock()
            .ok()?
            .binding
            .as_ref()
            .map(|b| b.resource_id.clone())
    }

    fn lock(&self) -> SyncResult<MutexGuard<'_, Inner>> {
        self.shared.inner.lock().map_err(|_| SyncError::LockPoisoned)
    }
}

impl EngineShared {
    /// Normal-path stream notification
    fn on_remote_change(shared: &Arc<Self>, generation: u64, document: Option<Document>) {
        let mut save_target = None;
        let mut template_write = None;
        let (became_connected, drain_needed) = {
            let Ok(mut inner) = shared.inner.lock() else { return };
            if inner.generation != generation {
                return;
            }
            let was = inner.monitor.is_connected();
            inner.monitor.set_store_reachable(true);
            let now = inner.monitor.is_connected();

            let mut queue_empty = true;
            if let Some(binding) = inner.binding.as_mut() {
                match document {
                    Some(document) => {
                        binding.document = Some(document.clone());
                        save_target = Some((binding.resource_id.clone(), document));
                    }
                    None => {
                        // Remote resource is empty: publish the default
                        // template. Its echo arrives as Some(template),
                        // takes the branch above and writes nothing again,
                        // so the write-notify recursion terminates.
                        let template =
                            Document::titled(shared.config.template_title.as_str());
                        binding.document = Some(template.clone());
                        template_write =
                            Some((binding.resource_id.clone(), template.clone()));
                        save_target = Some((binding.resource_id.clone(), template));
                    }
                }
                queue_empty = binding.queue.is_empty();
            } else {
                return;
            }
            if now
                && matches!(
                    inner.state,
                    EngineState::Initializing | EngineState::Disconnected
                )
            {
                inner.state = EngineState::Connected;
            }
            (now && !was, now && !was && !queue_empty)
        };

        if let Some((resource_id, document)) = save_target {
            shared.snapshots.save(&resource_id, &document);
        }
        if became_connected {
            shared.observer.connectivity_changed(true);
        }
        if let Some((resource_id, template)) = template_write {
            log::info!("Remote resource {resource_id} is empty, publishing default template");
            if let Err(e) = shared.remote.write_whole(&resource_id, &template) {
                log::error!("Failed to publish template for {resource_id}: {e}");
                Self::mark_unreachable(shared, generation);
            }
        }
        if drain_needed && shared.config.auto_drain {
            Self::drain(shared, generation);
        }
    }

    /// Error-path stream notification
    fn on_remote_failure(shared: &Arc<Self>, generation: u64, error: RemoteError) {
        log::error!("Remote stream error: {error}");
        let mut fallback_saved = None;
        let edge = {
            let Ok(mut inner) = shared.inner.lock() else { return };
            if inner.generation != generation {
                return;
            }
            let was = inner.monitor.is_connected();
            inner.monitor.set_store_reachable(false);
            inner.state = EngineState::Disconnected;
            if let Some(binding) = inner.binding.as_mut() {
                if binding.document.is_none() {
                    // Nothing adopted yet: fall back to the cached
                    // snapshot, else a fresh template
                    let fallback = shared
                        .snapshots
                        .load(&binding.resource_id)
                        .unwrap_or_else(|| {
                            Document::titled(shared.config.template_title.as_str())
                        });
                    binding.document = Some(fallback.clone());
                    fallback_saved = Some((binding.resource_id.clone(), fallback));
                }
            }
            was && !inner.monitor.is_connected()
        };

        if let Some((resource_id, document)) = fallback_saved {
            log::info!("Working offline with local data for {resource_id}");
            shared.snapshots.save(&resource_id, &document);
        }
        if edge {
            shared.observer.connectivity_changed(false);
        }
    }

    /// Demotes connectivity after a failed remote call
    fn mark_unreachable(shared: &Arc<Self>, generation: u64) {
        let edge = {
            let Ok(mut inner) = shared.inner.lock() else { return };
            if inner.generation != generation {
                return;
            }
            let was = inner.monitor.is_connected();
            inner.monitor.set_store_reachable(false);
            inner.state = EngineState::Disconnected;
            was && !inner.monitor.is_connected()
        };
        if edge {
            shared.observer.connectivity_changed(false);
        }
    }

    /// Flushes the queue by writing its most recent snapshot
    ///
    /// Each pass clears exactly the entries present when its snapshot was
    /// taken; entries arriving mid-flight survive and trigger another
    /// pass. A failed write leaves the queue intact for a later retry.
    fn drain(shared: &Arc<Self>, generation: u64) {
        loop {
            let mut target = None;
            {
                let Ok(mut inner) = shared.inner.lock() else { return };
                if inner.generation != generation {
                    return;
                }
                if !inner.monitor.is_connected() {
                    return;
                }
                let mut drained_count = 0;
                if let Some(binding) = inner.binding.as_mut() {
                    drained_count = binding.queue.len();
                    if let Some(entry) = binding.queue.last() {
                        target = Some((
                            binding.resource_id.clone(),
                            entry.document.clone(),
                            drained_count,
                        ));
                    }
                } else {
                    return;
                }
                if drained_count == 0 {
                    if inner.state == EngineState::Syncing {
                        inner.state = EngineState::Connected;
                    }
                    return;
                }
                inner.state = EngineState::Syncing;
            }

            let Some((resource_id, document, count)) = target else {
                return;
            };
            log::info!("Syncing {count} queued change(s) for {resource_id}");
            match shared.remote.write_whole(&resource_id, &document) {
                Ok(()) => {
                    let remaining = {
                        let Ok(mut inner) = shared.inner.lock() else { return };
                        if inner.generation != generation {
                            return;
                        }
                        let mut remaining = 0;
                        if let Some(binding) = inner.binding.as_mut() {
                            binding.queue.remove_first(count);
                            remaining = binding.queue.len();
                        }
                        if remaining == 0 && inner.state == EngineState::Syncing {
                            inner.state = EngineState::Connected;
                        }
                        remaining
                    };
                    shared.observer.queue_length_changed(remaining);
                    shared.observer.sync_finished(true);
                    if remaining == 0 {
                        log::info!("Sync completed for {resource_id}");
                        return;
                    }
                    // Entries arrived mid-flight; run another pass
                }
                Err(e) => {
                    log::error!("Sync failed for {resource_id}: {e}");
                    Self::mark_unreachable(shared, generation);
                    shared.observer.sync_finished(false);
                    return;
                }
            }
        }
    }
}
