// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod bridge;
pub mod channel;
pub mod clocks;
pub mod config;
pub mod discovery;
pub mod error;
pub mod link;
pub mod logging;
pub mod pacing;
pub mod render_thread;
pub mod rhi;
pub mod sync;

pub use bridge::{ReceiverContext, SenderContext, SurfaceKey, TextureSample};
pub use channel::{ChannelName, FrameRate};
pub use clocks::{Clock, ManualClock, SoftwareClock};
pub use config::{FrameLinkConfig, PublisherConfig, SubscriberConfig};
pub use discovery::{ChannelDirectory, ChannelInfo, InMemoryDirectory};
pub use error::*;
pub use link::*;
pub use pacing::{FramePacer, FrameRateLimiter, PollBudget};
pub use render_thread::RenderThread;
pub use rhi::{
    ApiGeneration, NativeTexture, RenderBackend, ResourceState, SharedHandle, SharedPixelFormat,
};
pub use sync::{EventNamespace, LocalEventNamespace, SyncRegistry};
