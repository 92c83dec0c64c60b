// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Device traits a platform backend implements.
//!
//! A backend exposes two device roles:
//!
//! - [`ImmediateDevice`]: the immediate-context device that owns the shared
//!   surface and performs copies and flushes.
//! - [`CompatDevice`]: the interop layer that lets the immediate device use
//!   resources allocated by an explicit-queue device. Only created when the
//!   host renders with the explicit-queue generation.

use crate::core::Result;

use super::backend::ApiGeneration;
use super::external_handle::SharedHandle;
use super::pixel_format::SharedPixelFormat;
use super::texture::{ResourceIdentity, ResourceState};

/// Immediate-context device plus its context.
pub trait ImmediateDevice: Send + Sync + 'static {
    type Texture: Clone + Send + Sync + 'static;

    /// Allocate a shareable surface and return it with its OS handle.
    fn create_shared_texture(
        &self,
        width: u32,
        height: u32,
        format: SharedPixelFormat,
    ) -> Result<(Self::Texture, SharedHandle)>;

    /// Open a surface shared by another device or process.
    fn open_shared_texture(&self, handle: SharedHandle) -> Result<Self::Texture>;

    /// Full-resource GPU copy. Both textures must match in size and format.
    fn copy_resource(&self, dst: &Self::Texture, src: &Self::Texture) -> Result<()>;

    /// Submit all queued work. Returns once the command stream is submitted.
    fn flush(&self) -> Result<()>;
}

/// Cross-generation interop device.
pub trait CompatDevice: Send + Sync + 'static {
    type Texture: Clone + Send + Sync + 'static;
    type QueueResource;

    /// Create an immediate-context view of an explicit-queue resource.
    fn wrap_resource(
        &self,
        resource: &Self::QueueResource,
        usage_state: ResourceState,
        release_state: ResourceState,
    ) -> Result<Self::Texture>;

    /// Return a wrapped view to its owner. Called exactly once per wrap.
    fn release_wrapped(&self, texture: &Self::Texture);
}

/// A platform graphics backend.
///
/// The API name is what the host reports for its active RHI ("D3D11",
/// "D3D12"); the generation is derived from it.
pub trait RenderBackend: Send + Sync + 'static {
    type Texture: Clone + Send + Sync + 'static;
    type QueueResource: ResourceIdentity + Clone + Send + Sync + 'static;
    type Device: ImmediateDevice<Texture = Self::Texture>;
    type Compat: CompatDevice<Texture = Self::Texture, QueueResource = Self::QueueResource>;

    fn api_name(&self) -> &str;

    /// Generation of the host's active RHI. Unknown names are an error.
    fn generation(&self) -> Result<ApiGeneration> {
        ApiGeneration::from_api_name(self.api_name())
    }

    /// The host's own immediate-context device.
    fn open_immediate_device(&self) -> Result<Self::Device>;

    /// An immediate-context device layered over the host's explicit-queue
    /// device, together with the interop device bound to its queue.
    fn create_compat_device(&self) -> Result<(Self::Device, Self::Compat)>;
}
