// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Channel orchestration: binds pacer, sync registry and bridge contexts
//! into a publisher and a subscriber endpoint.

mod output_time_step;
mod publisher;
mod state;
mod subscriber;
mod time_step;

pub use output_time_step::PublisherTimeStep;
pub use publisher::ChannelPublisher;
pub use state::{CaptureState, FrameNotifier, MediaState, NoopNotifier};
pub use subscriber::{ChannelSubscriber, SUBSCRIBE_SCHEME};
pub use time_step::{FrameSyncTimeStep, SynchronizationState};
