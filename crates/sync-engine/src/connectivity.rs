// crates/sync-engine/src/connectivity.rs
//! Connectivity tracking

/// Edge transition of the device network signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    /// Device regained network access
    BecameOnline,
    /// Device lost network access
    BecameOffline,
}

/// Tracks device and store reachability as two independent booleans
///
/// `device_online` follows the platform network signal, debounced so that
/// repeated identical signals produce no event. `store_reachable` is
/// updated by the sync engine from the outcome of each remote call. The
/// monitor is owned exclusively by the engine; the aggregate "connected"
/// state is the conjunction of both flags.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    device_online: bool,
    store_reachable: bool,
}

impl ConnectivityMonitor {
    /// Creates a monitor assuming the device is online and the store has
    /// not been reached yet
    pub fn new() -> Self {
        Self {
            device_online: true,
            store_reachable: false,
        }
    }

    /// Feeds the raw device network signal
    ///
    /// Returns an event only on a real edge; repeated identical signals
    /// return `None`.
    pub fn set_device_online(&mut self, online: bool) -> Option<ConnectivityEvent> {
        if online == self.device_online {
            return None;
        }
        self.device_online = online;
        Some(if online {
            ConnectivityEvent::BecameOnline
        } else {
            ConnectivityEvent::BecameOffline
        })
    }

    /// Records the outcome of a remote-store call
    ///
    /// Returns true when the flag actually changed.
    pub fn set_store_reachable(&mut self, reachable: bool) -> bool {
        if reachable == self.store_reachable {
            return false;
        }
        self.store_reachable = reachable;
        true
    }

    /// Current device network signal
    pub fn device_online(&self) -> bool {
        self.device_online
    }

    /// Whether the last remote call succeeded
    pub fn store_reachable(&self) -> bool {
        self.store_reachable
    }

    /// Aggregate connectivity: device online and store reachable
    pub fn is_connected(&self) -> bool {
        self.device_online && self.store_reachable
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}
