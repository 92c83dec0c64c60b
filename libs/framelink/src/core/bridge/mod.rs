// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Resource bridge: per-channel device state that moves frames into and out
//! of a shared surface, across API generations when needed.
//!
//! A context is built for one fixed (width, height, format). Any change means
//! dropping it and building a new one; nothing here resizes in place.

mod device;
mod receiver;
mod sender;
mod view_cache;

pub use device::BridgeDevice;
pub use receiver::{ReceiverContext, TextureSample};
pub use sender::SenderContext;
pub use view_cache::{CachedView, ViewCache, WrappedView};

use crate::core::rhi::SharedPixelFormat;

/// The geometry a context was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceKey {
    pub width: u32,
    pub height: u32,
    pub format: SharedPixelFormat,
}

impl SurfaceKey {
    pub fn new(width: u32, height: u32, format: SharedPixelFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }
}
