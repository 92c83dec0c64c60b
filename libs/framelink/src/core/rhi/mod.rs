// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Render Hardware Interface (RHI) - the device surface the bridge needs.

mod backend;
mod device;
mod external_handle;
mod pixel_format;
mod texture;

pub use backend::ApiGeneration;
pub use device::{CompatDevice, ImmediateDevice, RenderBackend};
pub use external_handle::SharedHandle;
pub use pixel_format::SharedPixelFormat;
pub use texture::{NativeTexture, ResourceId, ResourceIdentity, ResourceState};
