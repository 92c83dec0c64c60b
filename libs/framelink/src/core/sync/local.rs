// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! In-process event namespace.
//!
//! Behaves like an OS namespace restricted to one process: every `open` or
//! `create` of the same name while any handle is alive yields a handle onto
//! the same latch. Used where no kernel namespace is available and in tests,
//! where separate registries stand in for separate processes.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::event::{EventNamespace, EventWaitResult, NamedEvent};
use crate::core::{FrameLinkError, Result};

struct EventCore {
    signaled: Mutex<bool>,
    cond: Condvar,
}

impl EventCore {
    fn new() -> Self {
        Self {
            signaled: Mutex::new(false),
            cond: Condvar::new(),
        }
    }
}

struct LocalEvent {
    core: Arc<EventCore>,
}

impl NamedEvent for LocalEvent {
    fn set(&self) -> Result<()> {
        let mut signaled = self.core.signaled.lock();
        *signaled = true;
        self.core.cond.notify_one();
        Ok(())
    }

    fn wait_timeout(&self, timeout: Duration) -> Result<EventWaitResult> {
        let deadline = Instant::now() + timeout;
        let mut signaled = self.core.signaled.lock();
        while !*signaled {
            if self.core.cond.wait_until(&mut signaled, deadline).timed_out() {
                break;
            }
        }

        if *signaled {
            // Auto-reset: the wait consumes the signal.
            *signaled = false;
            Ok(EventWaitResult::Signaled)
        } else {
            Ok(EventWaitResult::TimedOut)
        }
    }
}

/// Shared in-process namespace. Clones refer to the same namespace.
#[derive(Clone, Default)]
pub struct LocalEventNamespace {
    events: Arc<Mutex<HashMap<String, Weak<EventCore>>>>,
}

impl LocalEventNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live handles onto `name` across all holders.
    pub fn open_handles(&self, name: &str) -> usize {
        self.events
            .lock()
            .get(name)
            .map(|core| core.strong_count())
            .unwrap_or(0)
    }

    fn live_core(events: &HashMap<String, Weak<EventCore>>, name: &str) -> Option<Arc<EventCore>> {
        events.get(name).and_then(Weak::upgrade)
    }
}

impl EventNamespace for LocalEventNamespace {
    fn open(&self, name: &str) -> Result<Arc<dyn NamedEvent>> {
        let events = self.events.lock();
        match Self::live_core(&events, name) {
            Some(core) => Ok(Arc::new(LocalEvent { core })),
            None => Err(FrameLinkError::NotFound(format!("event '{}'", name))),
        }
    }

    fn create(&self, name: &str) -> Result<Arc<dyn NamedEvent>> {
        let mut events = self.events.lock();
        let core = match Self::live_core(&events, name) {
            Some(core) => core,
            None => {
                let core = Arc::new(EventCore::new());
                events.insert(name.to_string(), Arc::downgrade(&core));
                core
            }
        };
        Ok(Arc::new(LocalEvent { core }))
    }

    fn description(&self) -> &str {
        "in-process events"
    }
}
