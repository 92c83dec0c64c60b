// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use super::device::BridgeDevice;
use super::view_cache::{CachedView, ViewCache, WrappedView};
use super::SurfaceKey;
use crate::core::channel::{ChannelName, FrameRate};
use crate::core::discovery::{ChannelDirectory, ChannelInfo, ChannelPublication};
use crate::core::pacing::FramePacer;
use crate::core::rhi::{
    CompatDevice, ImmediateDevice, NativeTexture, RenderBackend, ResourceId, ResourceIdentity,
    ResourceState, SharedHandle,
};
use crate::core::{FrameLinkError, Result};

/// Producer side of a channel: owns the published shared surface and copies
/// host frames into it.
///
/// Fields drop top to bottom: the channel is retracted before any view,
/// surface or device is released.
pub struct SenderContext<B: RenderBackend> {
    publication: ChannelPublication,
    views: ViewCache<ResourceId, B>,
    shared_texture: B::Texture,
    bridge: BridgeDevice<B>,
    pacer: FramePacer,
    name: ChannelName,
    key: SurfaceKey,
    handle: SharedHandle,
}

impl<B: RenderBackend> SenderContext<B> {
    /// Pick the device for `seed`'s generation, allocate the shared surface
    /// and publish it under `name`.
    pub fn new(
        backend: &B,
        directory: Arc<dyn ChannelDirectory>,
        name: ChannelName,
        key: SurfaceKey,
        seed: &NativeTexture<B>,
        rate: FrameRate,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(FrameLinkError::Publish("sender name is empty".into()));
        }

        let bridge = BridgeDevice::open(backend, seed.generation())?;
        let (shared_texture, handle) =
            bridge
                .device()
                .create_shared_texture(key.width, key.height, key.format)?;

        let info = ChannelInfo::new(key.width, key.height, handle, key.format);
        let publication = ChannelPublication::publish(directory, name.base(), info)?;

        tracing::info!(
            channel = %name,
            width = key.width,
            height = key.height,
            format = %key.format,
            generation = %bridge.generation(),
            "Sender context ready"
        );

        Ok(Self {
            publication,
            views: ViewCache::new(),
            shared_texture,
            bridge,
            pacer: FramePacer::new(rate),
            name,
            key,
            handle,
        })
    }

    /// Copy `frame` into the shared surface if the pacer allows it.
    ///
    /// Returns `Ok(true)` when a frame was copied and flushed. Signalling
    /// consumers is left to the caller.
    pub fn tick(&mut self, frame: &NativeTexture<B>, now_secs: f64) -> Result<bool> {
        if !self.pacer.is_due(now_secs) {
            return Ok(false);
        }

        let source = self.resolve(frame)?;
        let device = self.bridge.device();
        device.copy_resource(&self.shared_texture, &source)?;
        device.flush()?;
        // Only a flushed copy uses up the pacing slot.
        self.pacer.mark_served(now_secs);

        self.publication.update(ChannelInfo::new(
            self.key.width,
            self.key.height,
            self.handle,
            self.key.format,
        ))?;

        tracing::trace!(channel = %self.name, now_secs, "Sent frame");
        Ok(true)
    }

    /// A texture the immediate device can copy from.
    fn resolve(&self, frame: &NativeTexture<B>) -> Result<B::Texture> {
        match frame {
            NativeTexture::Immediate(texture) => Ok(texture.clone()),
            NativeTexture::ExplicitQueue(resource) => {
                let compat = self.bridge.compat().ok_or_else(|| {
                    FrameLinkError::Wrap(
                        "explicit-queue frame on an immediate-context sender".into(),
                    )
                })?;

                let id = resource.resource_id();
                self.views.get_or_try_insert_with(id, || {
                    let texture = compat.wrap_resource(
                        resource,
                        ResourceState::CopySource,
                        ResourceState::Present,
                    )?;
                    tracing::debug!(channel = %self.name, resource = %id, "Wrapped frame resource");
                    Ok(CachedView::Wrapped(WrappedView::new(texture, compat.clone())))
                })
            }
        }
    }

    pub fn set_frame_rate(&mut self, rate: FrameRate) {
        self.pacer.set_frame_rate(rate);
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    pub fn name(&self) -> &ChannelName {
        &self.name
    }

    pub fn key(&self) -> SurfaceKey {
        self.key
    }

    pub fn handle(&self) -> SharedHandle {
        self.handle
    }

    pub fn bridge(&self) -> &BridgeDevice<B> {
        &self.bridge
    }

    /// Number of wrapped views held.
    pub fn cached_views(&self) -> usize {
        self.views.len()
    }
}

impl<B: RenderBackend> Drop for SenderContext<B> {
    fn drop(&mut self) {
        tracing::info!(
            channel = %self.name,
            views = self.views.len(),
            "Disposing sender context"
        );
    }
}
