// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::adapter::{AdapterStats, CounterEvent, SoftwareAdapter};
use super::texture::{SoftwareQueueResource, SoftwareTexture, ViewLease};
use crate::core::rhi::{
    ApiGeneration, CompatDevice, ImmediateDevice, RenderBackend, ResourceState, SharedHandle,
    SharedPixelFormat,
};
use crate::core::{FrameLinkError, Result};

/// Software stand-in for a host RHI.
pub struct SoftwareBackend {
    api_name: String,
    adapter: Arc<SoftwareAdapter>,
}

impl SoftwareBackend {
    /// A backend reporting `generation` on a fresh adapter.
    pub fn new(generation: ApiGeneration) -> Self {
        Self::on_adapter(SoftwareAdapter::new(), generation)
    }

    /// A backend on an existing adapter, e.g. the receiving side of a
    /// loopback pair.
    pub fn on_adapter(adapter: Arc<SoftwareAdapter>, generation: ApiGeneration) -> Self {
        let api_name = match generation {
            ApiGeneration::ImmediateContext => "D3D11",
            ApiGeneration::ExplicitQueue => "D3D12",
        };
        Self {
            api_name: api_name.to_string(),
            adapter,
        }
    }

    /// Another backend on this backend's adapter.
    pub fn sharing_adapter_with(&self, generation: ApiGeneration) -> Self {
        Self::on_adapter(self.adapter.clone(), generation)
    }

    /// A backend reporting an arbitrary API name.
    pub fn with_api_name(name: impl Into<String>) -> Self {
        Self {
            api_name: name.into(),
            adapter: SoftwareAdapter::new(),
        }
    }

    pub fn adapter(&self) -> &Arc<SoftwareAdapter> {
        &self.adapter
    }

    pub fn stats(&self) -> AdapterStats {
        self.adapter.stats()
    }

    /// A host render target of the immediate-context generation.
    pub fn create_texture(
        &self,
        width: u32,
        height: u32,
        format: SharedPixelFormat,
    ) -> SoftwareTexture {
        SoftwareTexture {
            surface: self
                .adapter
                .new_surface(width, height, format, ResourceState::Common),
            lease: None,
        }
    }

    /// A host render target of the explicit-queue generation, left in the
    /// present state the way a swap-chain-bound resource would be.
    pub fn create_queue_resource(
        &self,
        width: u32,
        height: u32,
        format: SharedPixelFormat,
    ) -> SoftwareQueueResource {
        SoftwareQueueResource {
            surface: self
                .adapter
                .new_surface(width, height, format, ResourceState::Present),
        }
    }
}

impl RenderBackend for SoftwareBackend {
    type Texture = SoftwareTexture;
    type QueueResource = SoftwareQueueResource;
    type Device = SoftwareDevice;
    type Compat = SoftwareCompat;

    fn api_name(&self) -> &str {
        &self.api_name
    }

    fn open_immediate_device(&self) -> Result<SoftwareDevice> {
        self.adapter.check_device_creation(false)?;
        Ok(SoftwareDevice::new(self.adapter.clone()))
    }

    fn create_compat_device(&self) -> Result<(SoftwareDevice, SoftwareCompat)> {
        self.adapter.check_device_creation(true)?;
        let device = SoftwareDevice::new(self.adapter.clone());
        self.adapter.count(CounterEvent::CompatCreated);
        Ok((
            device,
            SoftwareCompat {
                adapter: self.adapter.clone(),
            },
        ))
    }
}

pub struct SoftwareDevice {
    adapter: Arc<SoftwareAdapter>,
}

impl SoftwareDevice {
    fn new(adapter: Arc<SoftwareAdapter>) -> Self {
        adapter.count(CounterEvent::DeviceCreated);
        Self { adapter }
    }
}

impl ImmediateDevice for SoftwareDevice {
    type Texture = SoftwareTexture;

    fn create_shared_texture(
        &self,
        width: u32,
        height: u32,
        format: SharedPixelFormat,
    ) -> Result<(SoftwareTexture, SharedHandle)> {
        let surface = self
            .adapter
            .new_surface(width, height, format, ResourceState::Common);
        let handle = self.adapter.share(&surface);
        Ok((
            SoftwareTexture {
                surface,
                lease: None,
            },
            handle,
        ))
    }

    fn open_shared_texture(&self, handle: SharedHandle) -> Result<SoftwareTexture> {
        let surface = self.adapter.lookup(handle)?;
        Ok(SoftwareTexture {
            surface,
            lease: Some(ViewLease::opened(self.adapter.clone())),
        })
    }

    fn copy_resource(&self, dst: &SoftwareTexture, src: &SoftwareTexture) -> Result<()> {
        if src.is_released_wrap() {
            return Err(FrameLinkError::Gpu(
                "copy from a released wrapped resource".into(),
            ));
        }
        if (src.width(), src.height(), src.format()) != (dst.width(), dst.height(), dst.format())
        {
            return Err(FrameLinkError::Gpu(format!(
                "copy between mismatched surfaces: {}x{} {} -> {}x{} {}",
                src.width(),
                src.height(),
                src.format(),
                dst.width(),
                dst.height(),
                dst.format()
            )));
        }

        if !Arc::ptr_eq(&src.surface, &dst.surface) {
            let data = src.surface.pixels.lock().clone();
            dst.surface.pixels.lock().copy_from_slice(&data);
        }
        self.adapter.count(CounterEvent::Copy);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.adapter.count(CounterEvent::Flush);
        Ok(())
    }
}

impl Drop for SoftwareDevice {
    fn drop(&mut self) {
        self.adapter.count(CounterEvent::DeviceReleased);
    }
}

/// Interop device: wraps explicit-queue resources without copying them.
pub struct SoftwareCompat {
    adapter: Arc<SoftwareAdapter>,
}

impl CompatDevice for SoftwareCompat {
    type Texture = SoftwareTexture;
    type QueueResource = SoftwareQueueResource;

    fn wrap_resource(
        &self,
        resource: &SoftwareQueueResource,
        usage_state: ResourceState,
        release_state: ResourceState,
    ) -> Result<SoftwareTexture> {
        *resource.surface.state.lock() = usage_state;
        Ok(SoftwareTexture {
            surface: resource.surface.clone(),
            lease: Some(ViewLease::wrapped(self.adapter.clone(), release_state)),
        })
    }

    fn release_wrapped(&self, texture: &SoftwareTexture) {
        let Some((released, release_state)) = texture.wrapped_release() else {
            tracing::warn!("release_wrapped called on a texture that is not a wrapped view");
            return;
        };

        if released.swap(true, Ordering::SeqCst) {
            tracing::warn!("Wrapped view released twice");
            self.adapter.count(CounterEvent::DoubleRelease);
            return;
        }

        *texture.surface.state.lock() = release_state;
        self.adapter.count(CounterEvent::WrapReleased);
    }
}

impl Drop for SoftwareCompat {
    fn drop(&mut self) {
        self.adapter.count(CounterEvent::CompatReleased);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_names_map_to_generations() {
        let immediate = SoftwareBackend::new(ApiGeneration::ImmediateContext);
        assert_eq!(immediate.generation().unwrap(), ApiGeneration::ImmediateContext);

        let explicit = immediate.sharing_adapter_with(ApiGeneration::ExplicitQueue);
        assert_eq!(explicit.generation().unwrap(), ApiGeneration::ExplicitQueue);
        assert!(Arc::ptr_eq(immediate.adapter(), explicit.adapter()));

        assert!(SoftwareBackend::with_api_name("Vulkan").generation().is_err());
    }

    #[test]
    fn test_shared_handle_opens_same_memory() {
        let backend = SoftwareBackend::new(ApiGeneration::ImmediateContext);
        let device = backend.open_immediate_device().unwrap();

        let (shared, handle) = device
            .create_shared_texture(2, 2, SharedPixelFormat::Bgra8Unorm)
            .unwrap();
        shared.fill(9);

        let opened = device.open_shared_texture(handle).unwrap();
        assert_eq!(opened.read_pixels(), vec![9; 16]);

        drop(opened);
        assert_eq!(backend.stats().views_released, 1);

        drop(shared);
        assert!(device.open_shared_texture(handle).is_err());
        assert_eq!(backend.adapter().live_shared_surfaces(), 0);
    }

    #[test]
    fn test_wrap_and_release_track_state() {
        let backend = SoftwareBackend::new(ApiGeneration::ExplicitQueue);
        let (_device, compat) = backend.create_compat_device().unwrap();
        let resource =
            backend.create_queue_resource(4, 4, SharedPixelFormat::Rgba16Float);

        let view = compat
            .wrap_resource(&resource, ResourceState::CopySource, ResourceState::Present)
            .unwrap();
        assert_eq!(resource.state(), ResourceState::CopySource);

        compat.release_wrapped(&view);
        assert_eq!(resource.state(), ResourceState::Present);

        compat.release_wrapped(&view);
        let stats = backend.stats();
        assert_eq!(stats.wraps_created, 1);
        assert_eq!(stats.wraps_released, 1);
        assert_eq!(stats.double_releases, 1);
    }

    #[test]
    fn test_copy_rejects_mismatched_geometry() {
        let backend = SoftwareBackend::new(ApiGeneration::ImmediateContext);
        let device = backend.open_immediate_device().unwrap();
        let a = backend.create_texture(4, 4, SharedPixelFormat::Bgra8Unorm);
        let b = backend.create_texture(8, 4, SharedPixelFormat::Bgra8Unorm);

        assert!(matches!(
            device.copy_resource(&b, &a),
            Err(FrameLinkError::Gpu(_))
        ));
    }

    #[test]
    fn test_device_counters() {
        let backend = SoftwareBackend::new(ApiGeneration::ExplicitQueue);
        {
            let _pair = backend.create_compat_device().unwrap();
        }
        let stats = backend.stats();
        assert_eq!(stats.devices_created, 1);
        assert_eq!(stats.devices_released, 1);
        assert_eq!(stats.compat_created, 1);
        assert_eq!(stats.compat_released, 1);

        backend.adapter().set_fail_compat(true);
        assert!(matches!(
            backend.create_compat_device(),
            Err(FrameLinkError::DeviceCreation(_))
        ));
        assert!(backend.open_immediate_device().is_ok());
    }
}
