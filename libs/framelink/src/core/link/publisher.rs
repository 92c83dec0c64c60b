// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;
use std::time::Duration;

use super::state::{CaptureState, FrameNotifier, NoopNotifier};
use crate::core::bridge::{SenderContext, SurfaceKey};
use crate::core::channel::{base_name, ChannelName, FrameRate};
use crate::core::clocks::{Clock, SoftwareClock};
use crate::core::config::PublisherConfig;
use crate::core::discovery::ChannelDirectory;
use crate::core::pacing::FrameRateLimiter;
use crate::core::rhi::{NativeTexture, RenderBackend, SharedPixelFormat};
use crate::core::sync::SyncRegistry;
use crate::core::Result;

/// What a sender context was (or failed to be) built for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SenderKey {
    name: String,
    surface: SurfaceKey,
}

enum SenderSlot<B: RenderBackend> {
    Empty,
    Ready(SenderContext<B>),
    /// Construction failed for this key; not retried until the key changes.
    Failed(SenderKey),
}

/// Producer endpoint of a channel.
///
/// Call [`ChannelPublisher::on_frame`] from the host's render thread with
/// each captured frame. The publisher rebuilds its sender context whenever
/// name, size or format change, copies paced frames into the shared surface
/// and signals frame sync after each copy has been flushed.
pub struct ChannelPublisher<B: RenderBackend> {
    backend: Arc<B>,
    directory: Arc<dyn ChannelDirectory>,
    sync: Arc<SyncRegistry>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn FrameNotifier>,
    config: PublisherConfig,
    limiter: FrameRateLimiter,
    state: CaptureState,
    slot: SenderSlot<B>,
    frames_published: u64,
}

impl<B: RenderBackend> ChannelPublisher<B> {
    pub fn new(
        backend: Arc<B>,
        directory: Arc<dyn ChannelDirectory>,
        sync: Arc<SyncRegistry>,
        config: PublisherConfig,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SoftwareClock::new());
        Self {
            backend,
            directory,
            sync,
            limiter: FrameRateLimiter::with_clock(clock.clone()),
            clock,
            notifier: Arc::new(NoopNotifier),
            config,
            state: CaptureState::Stopped,
            slot: SenderSlot::Empty,
            frames_published: 0,
        }
    }

    /// Use `clock` for pacing and the frame-rate hold.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.limiter = FrameRateLimiter::with_clock(clock.clone());
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn FrameNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Begin capturing. Applies the frame-rate control setting.
    pub fn start(&mut self) -> Result<()> {
        self.config.validate()?;

        if self.config.enable_frame_rate_control {
            let rate = self.config.frame_rate;
            self.limiter.hold_fps(rate.numerator / rate.denominator);
        } else {
            self.limiter.disable();
        }

        self.state = CaptureState::Capturing;
        tracing::info!(
            sender = %self.config.sender_name,
            rate = %self.config.frame_rate,
            "Publisher started"
        );
        Ok(())
    }

    /// Stop capturing: release the sync event and dispose the sender
    /// context, which retracts the channel.
    pub fn stop(&mut self) {
        if self.state == CaptureState::Stopped && matches!(self.slot, SenderSlot::Empty) {
            return;
        }

        self.sync.clear(&self.config.sender_name);
        self.slot = SenderSlot::Empty;
        self.state = CaptureState::Stopped;
        tracing::info!(
            sender = %self.config.sender_name,
            frames = self.frames_published,
            "Publisher stopped"
        );
    }

    /// Offer one captured frame.
    ///
    /// Returns `Ok(true)` if the frame was copied and signalled, `Ok(false)`
    /// if paced out, not capturing, or the context for this geometry already
    /// failed. A construction failure is returned once, on the frame that
    /// triggered it.
    pub fn on_frame(
        &mut self,
        frame: &NativeTexture<B>,
        width: u32,
        height: u32,
        format: SharedPixelFormat,
    ) -> Result<bool> {
        if self.state != CaptureState::Capturing {
            return Ok(false);
        }

        let key = SenderKey {
            name: self.config.sender_name.clone(),
            surface: SurfaceKey::new(width, height, format),
        };

        let current = match &self.slot {
            SenderSlot::Ready(ctx) => {
                ctx.name().as_str() == key.name && ctx.key() == key.surface
            }
            SenderSlot::Failed(failed) => {
                if *failed == key {
                    return Ok(false);
                }
                false
            }
            SenderSlot::Empty => false,
        };

        if !current {
            self.rebuild(key, frame)?;
        }

        let SenderSlot::Ready(ctx) = &mut self.slot else {
            return Ok(false);
        };

        let produced = ctx.tick(frame, self.clock.now_secs())?;
        if produced {
            // The tick flushed before returning, so consumers never observe
            // the signal ahead of the copy.
            self.sync.signal(ctx.name().as_str());
            self.frames_published += 1;
            self.notifier
                .frame_published(ctx.name().base(), self.frames_published);
        }
        Ok(produced)
    }

    fn rebuild(&mut self, key: SenderKey, seed: &NativeTexture<B>) -> Result<()> {
        // The old context is disposed in full before the new one is built.
        if let SenderSlot::Ready(old) = &self.slot {
            tracing::info!(
                sender = %key.name,
                width = key.surface.width,
                height = key.surface.height,
                "Sender geometry changed, rebuilding context"
            );
            // A renamed channel no longer signals under its old event.
            let old_name = old.name().base();
            if old_name != base_name(&key.name) {
                self.sync.clear(old_name);
            }
        }
        self.slot = SenderSlot::Empty;

        match SenderContext::new(
            &*self.backend,
            self.directory.clone(),
            ChannelName::parse(key.name.clone()),
            key.surface,
            seed,
            self.config.frame_rate,
        ) {
            Ok(ctx) => {
                self.slot = SenderSlot::Ready(ctx);
                Ok(())
            }
            Err(e) => {
                tracing::error!(sender = %key.name, "Failed to create sender context: {}", e);
                self.slot = SenderSlot::Failed(key);
                Err(e)
            }
        }
    }

    /// Change the paced output rate, forwarded to the live context.
    pub fn set_output_frame_rate(&mut self, rate: FrameRate) {
        if !rate.is_valid() {
            tracing::warn!(%rate, "Ignoring invalid output frame rate");
            return;
        }
        self.config.frame_rate = rate;
        if let SenderSlot::Ready(ctx) = &mut self.slot {
            ctx.set_frame_rate(rate);
        }
    }

    /// Block the calling thread to hold `fps`. Returns how long it was held.
    pub fn set_frame_rate(&mut self, fps: u32) -> Duration {
        self.limiter.hold_fps(fps)
    }

    pub fn disable_frame_rate_control(&mut self) {
        self.limiter.disable();
    }

    pub fn is_frame_rate_control_enabled(&self) -> bool {
        self.limiter.is_enabled()
    }

    /// Signal frame sync outside the per-frame path.
    pub fn signal_frame_sync(&self) {
        self.sync.signal(&self.config.sender_name);
    }

    pub fn sender_name(&self) -> &str {
        &self.config.sender_name
    }

    /// Rename the channel. Takes effect on the next frame.
    pub fn set_sender_name(&mut self, name: impl Into<String>) {
        self.config.sender_name = name.into();
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Whether a sender context is live.
    pub fn is_ready(&self) -> bool {
        matches!(self.slot, SenderSlot::Ready(_))
    }

    pub fn context(&self) -> Option<&SenderContext<B>> {
        match &self.slot {
            SenderSlot::Ready(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn frames_published(&self) -> u64 {
        self.frames_published
    }
}

impl<B: RenderBackend> Drop for ChannelPublisher<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
