// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Cross-process GPU texture sharing.
//!
//! A publisher copies host frames into a shared GPU surface and signals a
//! named kernel event; subscribers in other processes discover the surface
//! by channel name, open it without a host-memory copy and wait on the same
//! event. When the host renders with an explicit-queue API, frames are
//! wrapped for the immediate-context device that owns the shared surface.

// Suppress pedantic clippy warnings that are intentional design choices
#![allow(clippy::type_complexity)] // Complex types are clear in context
#![allow(clippy::missing_safety_doc)] // Safety documented in implementation comments
#![allow(clippy::new_without_default)] // Device wrappers have no meaningful default

pub mod core;
pub mod software;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

pub use core::{
    ApiGeneration, CaptureState, ChannelDirectory, ChannelInfo, ChannelName, ChannelPublisher,
    ChannelSubscriber, Clock, FrameLinkConfig, FrameLinkError, FrameNotifier, FramePacer,
    FrameRate, FrameRateLimiter, FrameSyncTimeStep, InMemoryDirectory, LocalEventNamespace,
    ManualClock, MediaState, NativeTexture, PublisherConfig, PublisherTimeStep, RenderBackend,
    RenderThread, Result, SharedHandle, SharedPixelFormat, SoftwareClock, SubscriberConfig, SyncRegistry,
    TextureSample, SUBSCRIBE_SCHEME,
};
pub use software::SoftwareBackend;
