// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Cross-process frame synchronization over named kernel events.

mod event;
mod local;
mod registry;

use std::sync::Arc;

pub use event::{EventNamespace, EventWaitResult, NamedEvent};
pub use local::LocalEventNamespace;
pub use registry::SyncRegistry;

/// The kernel-visible event namespace for this platform.
///
/// Windows uses named Win32 events and Linux uses POSIX named semaphores.
/// Other platforms fall back to an in-process namespace.
pub fn platform_namespace() -> Arc<dyn EventNamespace> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(crate::windows::Win32EventNamespace::new())
    }

    #[cfg(target_os = "linux")]
    {
        Arc::new(crate::linux::PosixEventNamespace::new())
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux")))]
    {
        Arc::new(LocalEventNamespace::new())
    }
}
