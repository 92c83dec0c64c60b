// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::adapter::{CounterEvent, SoftwareAdapter, Surface};
use crate::core::rhi::{ResourceId, ResourceIdentity, ResourceState, SharedPixelFormat};
use crate::core::{FrameLinkError, Result};

pub(crate) enum LeaseKind {
    /// Opened from a shared handle.
    Opened,
    /// Wrapped from an explicit-queue resource.
    Wrapped {
        released: AtomicBool,
        release_state: ResourceState,
    },
}

/// Bookkeeping shared by every clone of one view.
pub(crate) struct ViewLease {
    adapter: Arc<SoftwareAdapter>,
    kind: LeaseKind,
}

impl ViewLease {
    pub(crate) fn opened(adapter: Arc<SoftwareAdapter>) -> Arc<Self> {
        adapter.count(CounterEvent::TextureOpened);
        Arc::new(Self {
            adapter,
            kind: LeaseKind::Opened,
        })
    }

    pub(crate) fn wrapped(adapter: Arc<SoftwareAdapter>, release_state: ResourceState) -> Arc<Self> {
        adapter.count(CounterEvent::WrapCreated);
        Arc::new(Self {
            adapter,
            kind: LeaseKind::Wrapped {
                released: AtomicBool::new(false),
                release_state,
            },
        })
    }
}

impl Drop for ViewLease {
    fn drop(&mut self) {
        if let LeaseKind::Opened = self.kind {
            self.adapter.count(CounterEvent::ViewReleased);
        }
    }
}

/// Immediate-context texture.
#[derive(Clone)]
pub struct SoftwareTexture {
    pub(crate) surface: Arc<Surface>,
    pub(crate) lease: Option<Arc<ViewLease>>,
}

impl SoftwareTexture {
    pub fn width(&self) -> u32 {
        self.surface.width
    }

    pub fn height(&self) -> u32 {
        self.surface.height
    }

    pub fn format(&self) -> SharedPixelFormat {
        self.surface.format
    }

    /// Identity of the underlying memory. Views of one surface share it.
    pub fn surface_id(&self) -> ResourceId {
        ResourceId(self.surface.id)
    }

    pub fn read_pixels(&self) -> Vec<u8> {
        self.surface.pixels.lock().clone()
    }

    pub fn write_pixels(&self, data: &[u8]) -> Result<()> {
        write_surface(&self.surface, data)
    }

    pub fn fill(&self, value: u8) {
        self.surface.pixels.lock().fill(value);
    }

    pub(crate) fn wrapped_release(&self) -> Option<(&AtomicBool, ResourceState)> {
        match self.lease.as_deref().map(|lease| &lease.kind) {
            Some(LeaseKind::Wrapped {
                released,
                release_state,
            }) => Some((released, *release_state)),
            _ => None,
        }
    }

    pub(crate) fn is_released_wrap(&self) -> bool {
        self.wrapped_release()
            .map(|(released, _)| released.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

/// Explicit-queue resource as a host would hand it over.
#[derive(Clone)]
pub struct SoftwareQueueResource {
    pub(crate) surface: Arc<Surface>,
}

impl SoftwareQueueResource {
    pub fn width(&self) -> u32 {
        self.surface.width
    }

    pub fn height(&self) -> u32 {
        self.surface.height
    }

    /// State the resource is currently declared to be in.
    pub fn state(&self) -> ResourceState {
        *self.surface.state.lock()
    }

    pub fn read_pixels(&self) -> Vec<u8> {
        self.surface.pixels.lock().clone()
    }

    pub fn write_pixels(&self, data: &[u8]) -> Result<()> {
        write_surface(&self.surface, data)
    }

    pub fn fill(&self, value: u8) {
        self.surface.pixels.lock().fill(value);
    }
}

impl ResourceIdentity for SoftwareQueueResource {
    fn resource_id(&self) -> ResourceId {
        ResourceId(self.surface.id)
    }
}

fn write_surface(surface: &Surface, data: &[u8]) -> Result<()> {
    let mut pixels = surface.pixels.lock();
    if data.len() != pixels.len() {
        return Err(FrameLinkError::Gpu(format!(
            "pixel data is {} bytes, surface holds {}",
            data.len(),
            pixels.len()
        )));
    }
    pixels.copy_from_slice(data);
    Ok(())
}
