// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;

use crate::core::rhi::{ResourceState, SharedHandle, SharedPixelFormat};
use crate::core::{FrameLinkError, Result};

/// Host-memory surface.
pub(crate) struct Surface {
    pub(crate) id: u64,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: SharedPixelFormat,
    pub(crate) pixels: Mutex<Vec<u8>>,
    pub(crate) state: Mutex<ResourceState>,
}

#[derive(Default)]
struct Counters {
    devices_created: AtomicU64,
    devices_released: AtomicU64,
    compat_created: AtomicU64,
    compat_released: AtomicU64,
    shared_textures: AtomicU64,
    textures_opened: AtomicU64,
    views_released: AtomicU64,
    wraps_created: AtomicU64,
    wraps_released: AtomicU64,
    double_releases: AtomicU64,
    copies: AtomicU64,
    flushes: AtomicU64,
}

/// Snapshot of an adapter's lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdapterStats {
    pub devices_created: u64,
    pub devices_released: u64,
    pub compat_created: u64,
    pub compat_released: u64,
    pub shared_textures: u64,
    pub textures_opened: u64,
    /// Opened shared-surface views whose last reference dropped.
    pub views_released: u64,
    pub wraps_created: u64,
    pub wraps_released: u64,
    /// Wrapped views released more than once. Always zero when correct.
    pub double_releases: u64,
    pub copies: u64,
    pub flushes: u64,
}

/// The "GPU" every software device of a process runs on.
pub struct SoftwareAdapter {
    shared: Mutex<HashMap<u64, Weak<Surface>>>,
    next_handle: AtomicU64,
    next_resource: AtomicU64,
    counters: Counters,
    fail_compat: AtomicBool,
    fail_device: AtomicBool,
}

impl SoftwareAdapter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            shared: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            next_resource: AtomicU64::new(1),
            counters: Counters::default(),
            fail_compat: AtomicBool::new(false),
            fail_device: AtomicBool::new(false),
        })
    }

    pub fn stats(&self) -> AdapterStats {
        let c = &self.counters;
        let load = |counter: &AtomicU64| counter.load(Ordering::SeqCst);
        AdapterStats {
            devices_created: load(&c.devices_created),
            devices_released: load(&c.devices_released),
            compat_created: load(&c.compat_created),
            compat_released: load(&c.compat_released),
            shared_textures: load(&c.shared_textures),
            textures_opened: load(&c.textures_opened),
            views_released: load(&c.views_released),
            wraps_created: load(&c.wraps_created),
            wraps_released: load(&c.wraps_released),
            double_releases: load(&c.double_releases),
            copies: load(&c.copies),
            flushes: load(&c.flushes),
        }
    }

    /// Make compatibility-device creation fail from now on.
    pub fn set_fail_compat(&self, fail: bool) {
        self.fail_compat.store(fail, Ordering::SeqCst);
    }

    /// Make every device creation fail from now on.
    pub fn set_fail_device(&self, fail: bool) {
        self.fail_device.store(fail, Ordering::SeqCst);
    }

    /// Number of shared surfaces still alive.
    pub fn live_shared_surfaces(&self) -> usize {
        let mut shared = self.shared.lock();
        shared.retain(|_, surface| surface.strong_count() > 0);
        shared.len()
    }

    pub(crate) fn new_surface(
        &self,
        width: u32,
        height: u32,
        format: SharedPixelFormat,
        state: ResourceState,
    ) -> Arc<Surface> {
        Arc::new(Surface {
            id: self.next_resource.fetch_add(1, Ordering::SeqCst),
            width,
            height,
            format,
            pixels: Mutex::new(vec![0; format.image_size(width, height)]),
            state: Mutex::new(state),
        })
    }

    pub(crate) fn share(&self, surface: &Arc<Surface>) -> SharedHandle {
        let raw = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.shared.lock().insert(raw, Arc::downgrade(surface));
        self.counters.shared_textures.fetch_add(1, Ordering::SeqCst);
        SharedHandle::from_raw(raw)
    }

    pub(crate) fn lookup(&self, handle: SharedHandle) -> Result<Arc<Surface>> {
        self.shared
            .lock()
            .get(&handle.as_raw())
            .and_then(Weak::upgrade)
            .ok_or_else(|| FrameLinkError::NotFound(format!("shared handle {}", handle)))
    }

    pub(crate) fn check_device_creation(&self, compat: bool) -> Result<()> {
        if self.fail_device.load(Ordering::SeqCst) {
            return Err(FrameLinkError::DeviceCreation(
                "software adapter refused device creation".into(),
            ));
        }
        if compat && self.fail_compat.load(Ordering::SeqCst) {
            return Err(FrameLinkError::DeviceCreation(
                "software adapter refused compatibility device creation".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn count(&self, event: CounterEvent) {
        let c = &self.counters;
        let counter = match event {
            CounterEvent::DeviceCreated => &c.devices_created,
            CounterEvent::DeviceReleased => &c.devices_released,
            CounterEvent::CompatCreated => &c.compat_created,
            CounterEvent::CompatReleased => &c.compat_released,
            CounterEvent::TextureOpened => &c.textures_opened,
            CounterEvent::ViewReleased => &c.views_released,
            CounterEvent::WrapCreated => &c.wraps_created,
            CounterEvent::WrapReleased => &c.wraps_released,
            CounterEvent::DoubleRelease => &c.double_releases,
            CounterEvent::Copy => &c.copies,
            CounterEvent::Flush => &c.flushes,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CounterEvent {
    DeviceCreated,
    DeviceReleased,
    CompatCreated,
    CompatReleased,
    TextureOpened,
    ViewReleased,
    WrapCreated,
    WrapReleased,
    DoubleRelease,
    Copy,
    Flush,
}
