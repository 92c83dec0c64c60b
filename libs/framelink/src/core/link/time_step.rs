// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use super::subscriber::ChannelSubscriber;
use crate::core::channel::FrameRate;
use crate::core::rhi::RenderBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynchronizationState {
    Closed,
    Synchronized,
}

/// Engine tick driver locked to a subscriber's incoming frames.
///
/// Each `update_time_step` blocks until the subscribed source has produced
/// a frame (or the wait gives up), so the host ticks at the source's rate.
pub struct FrameSyncTimeStep<B: RenderBackend> {
    subscriber: Option<Arc<ChannelSubscriber<B>>>,
}

impl<B: RenderBackend> FrameSyncTimeStep<B> {
    pub fn new(subscriber: Arc<ChannelSubscriber<B>>) -> Self {
        Self {
            subscriber: Some(subscriber),
        }
    }

    /// `false` when there is no subscriber to follow.
    pub fn initialize(&self) -> bool {
        self.subscriber.is_some()
    }

    pub fn shutdown(&mut self) {
        self.subscriber = None;
    }

    pub fn update_time_step(&self) -> bool {
        if self.subscriber.is_none() {
            return false;
        }
        let waited = self.wait_for_sync();
        tracing::trace!(waited, "Time step updated");
        true
    }

    pub fn synchronization_state(&self) -> SynchronizationState {
        match self.ready_subscriber() {
            Some(_) => SynchronizationState::Synchronized,
            None => SynchronizationState::Closed,
        }
    }

    /// The subscriber's rate, or 60/1 while it is not ready.
    pub fn fixed_frame_rate(&self) -> FrameRate {
        self.ready_subscriber()
            .map(|subscriber| subscriber.frame_rate())
            .unwrap_or(FrameRate::DEFAULT)
    }

    pub fn last_sync_count_delta(&self) -> u32 {
        1
    }

    pub fn is_last_sync_data_valid(&self) -> bool {
        self.ready_subscriber().is_some()
    }

    /// Frame-sync wait when enabled, otherwise the subscriber's blocking
    /// fallback (which always counts as synced).
    pub fn wait_for_sync(&self) -> bool {
        let Some(subscriber) = self.ready_subscriber() else {
            return false;
        };

        if subscriber.is_frame_sync_enabled() {
            subscriber.wait_for_frame_sync(subscriber.frame_sync_timeout())
        } else {
            subscriber.wait_for_sync();
            true
        }
    }

    fn ready_subscriber(&self) -> Option<&Arc<ChannelSubscriber<B>>> {
        self.subscriber
            .as_ref()
            .filter(|subscriber| subscriber.is_hardware_ready())
    }
}
