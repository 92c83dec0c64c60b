// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use super::device::BridgeDevice;
use super::view_cache::{CachedView, ViewCache};
use super::SurfaceKey;
use crate::core::rhi::{ImmediateDevice, RenderBackend, SharedHandle, SharedPixelFormat};
use crate::core::Result;

/// One received frame, handed to the consumer exactly once.
pub struct TextureSample<B: RenderBackend> {
    texture: B::Texture,
    width: u32,
    height: u32,
    format: SharedPixelFormat,
    srgb: bool,
    handle: SharedHandle,
    sequence: u64,
}

impl<B: RenderBackend> TextureSample<B> {
    pub fn texture(&self) -> &B::Texture {
        &self.texture
    }

    pub fn into_texture(self) -> B::Texture {
        self.texture
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> SharedPixelFormat {
        self.format
    }

    pub fn is_srgb(&self) -> bool {
        self.srgb
    }

    pub fn handle(&self) -> SharedHandle {
        self.handle
    }

    /// Position in the subscriber's delivery order, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl<B: RenderBackend> std::fmt::Debug for TextureSample<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureSample")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("srgb", &self.srgb)
            .field("handle", &self.handle)
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// Consumer side of a channel: the device that opens the peer's shared
/// surface, built for one discovered geometry.
pub struct ReceiverContext<B: RenderBackend> {
    views: ViewCache<SharedHandle, B>,
    bridge: BridgeDevice<B>,
    key: SurfaceKey,
}

impl<B: RenderBackend> ReceiverContext<B> {
    /// Build for `key` using the host's active API generation. An API name
    /// outside the known generations fails here.
    pub fn new(backend: &B, key: SurfaceKey) -> Result<Self> {
        let generation = backend.generation()?;
        let bridge = BridgeDevice::open(backend, generation)?;

        tracing::info!(
            width = key.width,
            height = key.height,
            format = %key.format,
            %generation,
            "Receiver context ready"
        );

        Ok(Self {
            views: ViewCache::new(),
            bridge,
            key,
        })
    }

    /// Whether this context was built for `key`.
    pub fn matches(&self, key: &SurfaceKey) -> bool {
        self.key == *key
    }

    pub fn key(&self) -> SurfaceKey {
        self.key
    }

    pub fn device(&self) -> &B::Device {
        self.bridge.device()
    }

    pub fn compat(&self) -> Option<&Arc<B::Compat>> {
        self.bridge.compat()
    }

    /// Produce a sample view of the surface behind `handle`.
    ///
    /// The opened surface is cached per handle; a new handle replaces the
    /// previous one.
    pub fn open_sample(
        &self,
        handle: SharedHandle,
        srgb: bool,
        sequence: u64,
    ) -> Result<TextureSample<B>> {
        if !self.views.contains(&handle) && !self.views.is_empty() {
            tracing::debug!(%handle, "Shared handle changed, dropping old view");
            self.views.clear();
        }

        let device = self.bridge.device();
        let texture = self.views.get_or_try_insert_with(handle, || {
            Ok(CachedView::Opened(device.open_shared_texture(handle)?))
        })?;

        Ok(TextureSample {
            texture,
            width: self.key.width,
            height: self.key.height,
            format: self.key.format,
            srgb,
            handle,
            sequence,
        })
    }
}

impl<B: RenderBackend> Drop for ReceiverContext<B> {
    fn drop(&mut self) {
        tracing::info!(
            width = self.key.width,
            height = self.key.height,
            "Disposing receiver context"
        );
    }
}
