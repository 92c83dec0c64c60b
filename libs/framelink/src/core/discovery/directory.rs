// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::rhi::{SharedHandle, SharedPixelFormat};
use crate::core::Result;

/// What discovery reports for a published channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub width: u32,
    pub height: u32,
    pub handle: SharedHandle,
    /// Native format code as published. May be outside the supported set.
    pub format_code: u32,
}

impl ChannelInfo {
    pub fn new(width: u32, height: u32, handle: SharedHandle, format: SharedPixelFormat) -> Self {
        Self {
            width,
            height,
            handle,
            format_code: format.native_code(),
        }
    }

    /// Decode the native format code.
    pub fn format(&self) -> Result<SharedPixelFormat> {
        SharedPixelFormat::from_native_code(self.format_code)
    }
}

/// Name-keyed registry of published channels.
///
/// Names are base names: any `|FPS=` suffix is stripped by implementations
/// before storing or looking up.
pub trait ChannelDirectory: Send + Sync {
    /// Register a new channel. Fails if the name is held by a live channel.
    fn publish(&self, name: &str, info: ChannelInfo) -> Result<()>;

    /// Replace the info of a channel this process published.
    fn update(&self, name: &str, info: ChannelInfo) -> Result<()>;

    /// Look a channel up. `None` is a transient miss, not an error.
    fn find(&self, name: &str) -> Option<ChannelInfo>;

    /// Remove a channel. Unknown names are ignored.
    fn retract(&self, name: &str);

    fn channel_names(&self) -> Vec<String>;
}

/// Ownership of one published name. Dropping it retracts the channel.
pub struct ChannelPublication {
    directory: Arc<dyn ChannelDirectory>,
    name: String,
}

impl ChannelPublication {
    /// Publish `info` under `name` and hold the registration.
    pub fn publish(
        directory: Arc<dyn ChannelDirectory>,
        name: &str,
        info: ChannelInfo,
    ) -> Result<Self> {
        directory.publish(name, info)?;
        tracing::info!(
            channel = name,
            width = info.width,
            height = info.height,
            handle = %info.handle,
            "Published channel"
        );
        Ok(Self {
            directory,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn update(&self, info: ChannelInfo) -> Result<()> {
        self.directory.update(&self.name, info)
    }
}

impl Drop for ChannelPublication {
    fn drop(&mut self) {
        self.directory.retract(&self.name);
        tracing::debug!(channel = %self.name, "Retracted channel");
    }
}
