// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;
use std::time::Duration;

use crate::core::Result;

/// Outcome of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWaitResult {
    /// The event fired and was consumed by this wait.
    Signaled,
    TimedOut,
}

/// A named, auto-reset event visible to every process in the namespace.
///
/// `set` latches the signaled state until exactly one waiter consumes it.
/// The underlying OS handle is closed when the last reference drops.
pub trait NamedEvent: Send + Sync {
    fn set(&self) -> Result<()>;

    fn wait_timeout(&self, timeout: Duration) -> Result<EventWaitResult>;
}

/// Namespace in which named events live.
///
/// `open` attaches to an existing object and fails if none exists; `create`
/// must return the existing object when another party created the name
/// first.
pub trait EventNamespace: Send + Sync {
    fn open(&self, name: &str) -> Result<Arc<dyn NamedEvent>>;

    fn create(&self, name: &str) -> Result<Arc<dyn NamedEvent>>;

    fn description(&self) -> &str;
}
