// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

/// Host playback state gating a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaState {
    #[default]
    Closed,
    Playing,
    Paused,
}

/// Host capture state gating a publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Stopped,
    Capturing,
}

/// Per-frame hook into the host. Both callbacks default to no-ops.
pub trait FrameNotifier: Send + Sync {
    /// A frame was copied, flushed and signalled. `frame` counts from 1.
    fn frame_published(&self, _channel: &str, _frame: u64) {}

    /// A sample was queued for the consumer.
    fn frame_received(&self, _channel: &str, _sequence: u64) {}
}

pub struct NoopNotifier;

impl FrameNotifier for NoopNotifier {}
