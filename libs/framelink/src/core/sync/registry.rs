// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::event::{EventNamespace, EventWaitResult, NamedEvent};
use crate::core::channel::{base_name, sync_object_name};
use crate::core::Result;

/// Process-side map from channel to its frame-sync event.
///
/// Entries are created lazily by the first `signal` or `wait` for a channel
/// and keyed by base name, so `"Cam|FPS=30"` and `"Cam"` share one event.
/// The map lock is never held across a wait.
pub struct SyncRegistry {
    namespace: Arc<dyn EventNamespace>,
    events: Mutex<HashMap<String, Arc<dyn NamedEvent>>>,
}

impl SyncRegistry {
    /// Registry over the platform's kernel event namespace.
    pub fn new() -> Self {
        Self::with_namespace(super::platform_namespace())
    }

    pub fn with_namespace(namespace: Arc<dyn EventNamespace>) -> Self {
        tracing::debug!(namespace = namespace.description(), "Created sync registry");
        Self {
            namespace,
            events: Mutex::new(HashMap::new()),
        }
    }

    /// Signal "frame ready" on `channel`. Empty names are ignored.
    pub fn signal(&self, channel: &str) {
        let Some(event) = self.resolve(channel) else {
            return;
        };

        if let Err(e) = event.set() {
            tracing::warn!(channel, "Failed to signal frame sync: {}", e);
        }
    }

    /// Block up to `timeout` for a signal on `channel`.
    ///
    /// Returns `false` on timeout, on an empty name, or when the event
    /// cannot be resolved.
    pub fn wait(&self, channel: &str, timeout: Duration) -> bool {
        let Some(event) = self.resolve(channel) else {
            return false;
        };

        match event.wait_timeout(timeout) {
            Ok(EventWaitResult::Signaled) => true,
            Ok(EventWaitResult::TimedOut) => {
                tracing::debug!(channel, ?timeout, "Frame sync wait timed out");
                false
            }
            Err(e) => {
                tracing::warn!(channel, "Frame sync wait failed: {}", e);
                false
            }
        }
    }

    /// Forget the local handle for `channel`. Unknown names are ignored.
    pub fn clear(&self, channel: &str) {
        let key = base_name(channel);
        if self.events.lock().remove(key).is_some() {
            tracing::debug!(channel = key, "Released frame sync event");
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    fn resolve(&self, channel: &str) -> Option<Arc<dyn NamedEvent>> {
        let key = base_name(channel);
        if key.is_empty() {
            return None;
        }

        let mut events = self.events.lock();
        if let Some(event) = events.get(key) {
            return Some(event.clone());
        }

        match self.open_or_create(&sync_object_name(key)) {
            Ok(event) => {
                events.insert(key.to_string(), event.clone());
                Some(event)
            }
            Err(e) => {
                tracing::warn!(channel = key, "Failed to resolve frame sync event: {}", e);
                None
            }
        }
    }

    /// Attach to the peer's event if it exists, otherwise create it. A peer
    /// racing us to create the same name is fine: create returns its object.
    fn open_or_create(&self, name: &str) -> Result<Arc<dyn NamedEvent>> {
        match self.namespace.open(name) {
            Ok(event) => Ok(event),
            Err(_) => self.namespace.create(name),
        }
    }
}

impl Default for SyncRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SyncRegistry {
    fn drop(&mut self) {
        let released = self.events.get_mut().len();
        self.events.get_mut().clear();
        if released > 0 {
            tracing::debug!(released, "Sync registry released events");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::LocalEventNamespace;

    fn registry(ns: &LocalEventNamespace) -> SyncRegistry {
        SyncRegistry::with_namespace(Arc::new(ns.clone()))
    }

    #[test]
    fn test_signal_then_wait_succeeds() {
        let ns = LocalEventNamespace::new();
        let reg = registry(&ns);

        reg.signal("Cam");
        assert!(reg.wait("Cam", Duration::from_millis(10)));
        assert!(!reg.wait("Cam", Duration::from_millis(10)));
    }

    #[test]
    fn test_rate_hint_shares_event() {
        let ns = LocalEventNamespace::new();
        let sender = registry(&ns);
        let receiver = registry(&ns);

        sender.signal("Cam|FPS=30/1");
        assert!(receiver.wait("Cam", Duration::from_millis(100)));
        assert_eq!(ns.open_handles("Spout-Sync-Cam"), 2);
    }

    #[test]
    fn test_waiter_created_before_signaller() {
        let ns = LocalEventNamespace::new();
        let receiver = registry(&ns);
        let sender = registry(&ns);

        assert!(!receiver.wait("Cam", Duration::from_millis(1)));
        sender.signal("Cam");
        assert!(receiver.wait("Cam", Duration::from_millis(100)));
    }

    #[test]
    fn test_empty_name_is_noop() {
        let ns = LocalEventNamespace::new();
        let reg = registry(&ns);

        reg.signal("");
        assert!(!reg.wait("", Duration::from_millis(1)));
        assert!(!reg.wait("|FPS=30", Duration::from_millis(1)));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_one_entry_per_channel() {
        let ns = LocalEventNamespace::new();
        let reg = registry(&ns);

        reg.signal("Cam");
        reg.signal("Cam|FPS=30");
        reg.wait("Cam", Duration::ZERO);
        assert_eq!(reg.len(), 1);
        assert_eq!(ns.open_handles("Spout-Sync-Cam"), 1);
    }

    #[test]
    fn test_clear_releases_handle() {
        let ns = LocalEventNamespace::new();
        let reg = registry(&ns);

        reg.signal("Cam");
        reg.clear("Cam");
        reg.clear("Cam");
        reg.clear("Other");

        assert!(reg.is_empty());
        assert_eq!(ns.open_handles("Spout-Sync-Cam"), 0);
    }

    #[test]
    fn test_drop_releases_every_handle() {
        let ns = LocalEventNamespace::new();
        {
            let reg = registry(&ns);
            reg.signal("A");
            reg.signal("B");
            assert_eq!(ns.open_handles("Spout-Sync-A"), 1);
        }
        assert_eq!(ns.open_handles("Spout-Sync-A"), 0);
        assert_eq!(ns.open_handles("Spout-Sync-B"), 0);
    }

    #[test]
    fn test_wait_does_not_block_signal() {
        let ns = LocalEventNamespace::new();
        let reg = Arc::new(registry(&ns));

        let waiter = {
            let reg = reg.clone();
            std::thread::spawn(move || reg.wait("Cam", Duration::from_secs(5)))
        };

        std::thread::sleep(Duration::from_millis(20));
        // Would deadlock if the waiter held the map lock.
        reg.signal("Cam");
        assert!(waiter.join().unwrap());
    }
}
