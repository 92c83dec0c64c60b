// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::publisher::ChannelPublisher;
use super::state::CaptureState;
use crate::core::channel::FrameRate;
use crate::core::rhi::RenderBackend;

/// Engine tick driver for a sending host.
///
/// Ticks at the publisher's output rate and, unless told otherwise, starts
/// capture on `initialize`.
pub struct PublisherTimeStep<B: RenderBackend> {
    publisher: Option<ChannelPublisher<B>>,
    auto_start_capture: bool,
}

impl<B: RenderBackend> PublisherTimeStep<B> {
    pub fn new(publisher: ChannelPublisher<B>) -> Self {
        Self {
            publisher: Some(publisher),
            auto_start_capture: true,
        }
    }

    /// A time step with no output bound. Ticks at 60/1.
    pub fn unbound() -> Self {
        Self {
            publisher: None,
            auto_start_capture: true,
        }
    }

    pub fn with_auto_start_capture(mut self, auto_start: bool) -> Self {
        self.auto_start_capture = auto_start;
        self
    }

    /// `false` when there is no output. A capture that fails to start is
    /// logged and does not fail initialization.
    pub fn initialize(&mut self) -> bool {
        let auto_start = self.auto_start_capture;
        let Some(publisher) = self.publisher.as_mut() else {
            return false;
        };

        if auto_start && publisher.state() != CaptureState::Capturing {
            if let Err(e) = publisher.start() {
                tracing::error!(
                    sender = %publisher.sender_name(),
                    "Failed to auto-start capture: {}",
                    e
                );
            }
        }
        true
    }

    /// Stop a capturing publisher. The output stays bound.
    pub fn shutdown(&mut self) {
        if let Some(publisher) = self.publisher.as_mut() {
            if publisher.state() == CaptureState::Capturing {
                publisher.stop();
            }
        }
    }

    pub fn update_time_step(&self) -> bool {
        true
    }

    /// The output rate, or 60/1 with no output bound.
    pub fn fixed_frame_rate(&self) -> FrameRate {
        self.publisher
            .as_ref()
            .map(|publisher| publisher.config().frame_rate)
            .unwrap_or(FrameRate::DEFAULT)
    }

    pub fn publisher(&self) -> Option<&ChannelPublisher<B>> {
        self.publisher.as_ref()
    }

    /// The bound publisher, for feeding frames from the render thread.
    pub fn publisher_mut(&mut self) -> Option<&mut ChannelPublisher<B>> {
        self.publisher.as_mut()
    }
}
