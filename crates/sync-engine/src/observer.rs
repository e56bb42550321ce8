// crates/sync-engine/src/observer.rs
//! Notification interface toward the UI layer

/// Receives user-visible sync signals
///
/// The engine emits these for the presentation layer (connection banners,
/// "N pending" badges, sync toasts); it owns none of the presentation
/// itself. Connectivity signals fire on aggregate edges only; the queue
/// length is reported on bind and whenever it changes.
pub trait SyncObserver: Send + Sync {
    /// Aggregate connectivity changed
    fn connectivity_changed(&self, _connected: bool) {}

    /// Number of queued pending writes changed
    fn queue_length_changed(&self, _pending: usize) {}

    /// A drain attempt finished
    fn sync_finished(&self, _success: bool) {}
}

/// Observer that ignores every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SyncObserver for NullObserver {}
