// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::state::{FrameNotifier, MediaState, NoopNotifier};
use crate::core::bridge::{ReceiverContext, SurfaceKey, TextureSample};
use crate::core::channel::{ChannelName, FrameRate};
use crate::core::config::SubscriberConfig;
use crate::core::discovery::ChannelDirectory;
use crate::core::pacing::poll_for_new_frame;
use crate::core::render_thread::RenderThread;
use crate::core::rhi::RenderBackend;
use crate::core::sync::SyncRegistry;
use crate::core::Result;

/// URL scheme a subscriber opens: `spout2mediain://<source name>`.
pub const SUBSCRIBE_SCHEME: &str = "spout2mediain";

enum ReceiverSlot<B: RenderBackend> {
    Empty,
    Ready(ReceiverContext<B>),
    /// Construction failed for this geometry; not retried until it changes.
    Failed(SurfaceKey),
}

struct Playback {
    state: MediaState,
    source: Option<ChannelName>,
    url: Option<String>,
    frame_rate: FrameRate,
    srgb: bool,
    use_frame_sync: bool,
    link_rendering_to_frame_sync: bool,
}

/// Consumer endpoint of a channel.
///
/// Methods take `&self` so one subscriber can be polled from the host's
/// tick, drained by its renderer and waited on by a time step at once.
/// Receiver contexts are only built, used and dropped on the render thread.
pub struct ChannelSubscriber<B: RenderBackend> {
    backend: Arc<B>,
    directory: Arc<dyn ChannelDirectory>,
    sync: Arc<SyncRegistry>,
    render: Arc<RenderThread>,
    notifier: Arc<dyn FrameNotifier>,
    config: SubscriberConfig,
    playback: Mutex<Playback>,
    receiver: Arc<Mutex<ReceiverSlot<B>>>,
    pending: Mutex<Option<TextureSample<B>>>,
    delivered: AtomicU64,
    last_observed: AtomicU64,
    sequence: AtomicU64,
    contexts_built: AtomicU64,
}

impl<B: RenderBackend> ChannelSubscriber<B> {
    pub fn new(
        backend: Arc<B>,
        directory: Arc<dyn ChannelDirectory>,
        sync: Arc<SyncRegistry>,
        render: Arc<RenderThread>,
        config: SubscriberConfig,
    ) -> Self {
        let playback = Playback {
            state: MediaState::Closed,
            source: None,
            url: None,
            frame_rate: FrameRate::DEFAULT,
            srgb: config.srgb,
            use_frame_sync: config.use_frame_sync,
            link_rendering_to_frame_sync: config.link_rendering_to_frame_sync,
        };

        Self {
            backend,
            directory,
            sync,
            render,
            notifier: Arc::new(NoopNotifier),
            config,
            playback: Mutex::new(playback),
            receiver: Arc::new(Mutex::new(ReceiverSlot::Empty)),
            pending: Mutex::new(None),
            delivered: AtomicU64::new(0),
            last_observed: AtomicU64::new(0),
            sequence: AtomicU64::new(0),
            contexts_built: AtomicU64::new(0),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn FrameNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Open `spout2mediain://<source>`. Other schemes, and bare names
    /// without a scheme, are rejected.
    ///
    /// A `|FPS=` hint in the source name sets the frame rate; otherwise the
    /// configured target applies while the rate is still the default.
    pub fn open(&self, url: &str) -> bool {
        let Some((scheme, location)) = url.split_once("://") else {
            tracing::warn!(url, "Rejected source URL without a scheme");
            return false;
        };
        if scheme != SUBSCRIBE_SCHEME {
            tracing::warn!(url, "Rejected source URL with unknown scheme");
            return false;
        }

        if self.playback.lock().state != MediaState::Closed {
            self.close();
        }

        // An empty location selects the configured default source.
        let source = if location.is_empty() {
            ChannelName::parse(self.config.source_name.as_str())
        } else {
            ChannelName::parse(location)
        };
        let mut playback = self.playback.lock();
        playback.frame_rate = match source.rate_hint() {
            Some(rate) => rate,
            None if playback.frame_rate == FrameRate::DEFAULT => self.config.target_frame_rate,
            None => playback.frame_rate,
        };
        playback.srgb = self.config.srgb;
        playback.use_frame_sync = self.config.use_frame_sync;
        playback.link_rendering_to_frame_sync = self.config.link_rendering_to_frame_sync;
        playback.url = Some(url.to_string());
        playback.state = MediaState::Playing;

        tracing::info!(
            source = source.base(),
            rate = %playback.frame_rate,
            frame_sync = playback.use_frame_sync,
            "Subscriber opened"
        );
        playback.source = Some(source);
        true
    }

    /// Release the sync event, drop any pending sample and dispose the
    /// receiver context on the render thread.
    pub fn close(&self) {
        let source = {
            let mut playback = self.playback.lock();
            playback.state = MediaState::Closed;
            playback.source.clone()
        };

        if let Some(source) = &source {
            self.sync.clear(source.base());
        }
        self.pending.lock().take();

        let slot = self.receiver.clone();
        if let Err(e) = self.render.run_blocking(move || {
            *slot.lock() = ReceiverSlot::Empty;
        }) {
            tracing::warn!("Failed to dispose receiver context: {}", e);
        }

        if let Some(source) = source {
            tracing::info!(source = source.base(), "Subscriber closed");
        }
    }

    /// Poll discovery and queue a fresh sample of the source's surface.
    ///
    /// Returns `Ok(false)` when closed, when the source is not published or
    /// uses an unsupported format (the previous sample is kept), or when the
    /// receiver for this geometry already failed. A construction failure is
    /// returned once.
    pub fn tick_fetch(&self) -> Result<bool> {
        let (source, srgb) = {
            let playback = self.playback.lock();
            if playback.state == MediaState::Closed {
                return Ok(false);
            }
            match &playback.source {
                Some(source) => (source.base().to_string(), playback.srgb),
                None => return Ok(false),
            }
        };

        let Some(info) = self.directory.find(&source) else {
            tracing::debug!(source = %source, "Source not found, skipping poll");
            return Ok(false);
        };
        let format = match info.format() {
            Ok(format) => format,
            Err(e) => {
                tracing::debug!(source = %source, "Skipping poll: {}", e);
                return Ok(false);
            }
        };

        let key = SurfaceKey::new(info.width, info.height, format);
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let slot = self.receiver.clone();
        let backend = self.backend.clone();

        let (sample, built) = self.render.run_blocking(move || {
            let mut slot = slot.lock();
            let mut built = false;

            let current = match &*slot {
                ReceiverSlot::Ready(ctx) => ctx.matches(&key),
                ReceiverSlot::Failed(failed) if *failed == key => {
                    return Ok((None, false));
                }
                _ => false,
            };

            if !current {
                // Old context disposed in full before the new one exists.
                *slot = ReceiverSlot::Empty;
                match ReceiverContext::new(&*backend, key) {
                    Ok(ctx) => {
                        *slot = ReceiverSlot::Ready(ctx);
                        built = true;
                    }
                    Err(e) => {
                        tracing::error!("Failed to create receiver context: {}", e);
                        *slot = ReceiverSlot::Failed(key);
                        return Err(e);
                    }
                }
            }

            match &*slot {
                ReceiverSlot::Ready(ctx) => ctx
                    .open_sample(info.handle, srgb, sequence)
                    .map(|sample| (Some(sample), built)),
                _ => Ok((None, built)),
            }
        })??;

        if built {
            self.contexts_built.fetch_add(1, Ordering::Relaxed);
        }

        let Some(sample) = sample else {
            return Ok(false);
        };

        // Latest wins: an unconsumed sample is replaced.
        let replaced = self.pending.lock().replace(sample);
        if replaced.is_some() {
            tracing::trace!(source = %source, "Replaced unconsumed sample");
        }
        drop(replaced);

        self.delivered.fetch_add(1, Ordering::Release);
        self.notifier.frame_received(&source, sequence);
        tracing::trace!(source = %source, sequence, "Queued sample");
        Ok(true)
    }

    /// Take the pending sample. Only while playing or paused.
    pub fn fetch_video(&self) -> Option<TextureSample<B>> {
        match self.playback.lock().state {
            MediaState::Playing | MediaState::Paused => self.pending.lock().take(),
            MediaState::Closed => None,
        }
    }

    /// Discard any pending sample.
    pub fn flush_samples(&self) {
        self.pending.lock().take();
    }

    /// Block until a new frame is ready.
    ///
    /// With frame sync enabled, waits on the source's sync event for the
    /// configured timeout. If that is disabled or times out, polls the
    /// delivery counter within the configured poll budget. Returns whether a
    /// new frame was observed.
    pub fn wait_for_sync(&self) -> bool {
        let (source, use_frame_sync) = {
            let playback = self.playback.lock();
            if playback.state != MediaState::Playing {
                return false;
            }
            (
                playback.source.as_ref().map(|s| s.base().to_string()),
                playback.use_frame_sync,
            )
        };

        if use_frame_sync {
            if let Some(source) = &source {
                if self.sync.wait(source, self.config.frame_sync_timeout()) {
                    self.last_observed
                        .store(self.delivered.load(Ordering::Acquire), Ordering::Release);
                    return true;
                }
            }
        }

        let last = self.last_observed.load(Ordering::Acquire);
        match poll_for_new_frame(&self.delivered, last, self.config.poll_budget()) {
            Some(current) => {
                self.last_observed.store(current, Ordering::Release);
                true
            }
            None => {
                tracing::debug!("No new frame within the poll budget");
                false
            }
        }
    }

    /// Frame-sync wait only, with an explicit timeout. `false` when frame
    /// sync is disabled or no source is open.
    pub fn wait_for_frame_sync(&self, timeout: Duration) -> bool {
        let source = {
            let playback = self.playback.lock();
            if !playback.use_frame_sync {
                return false;
            }
            match &playback.source {
                Some(source) => source.base().to_string(),
                None => return false,
            }
        };
        self.sync.wait(&source, timeout)
    }

    pub fn is_hardware_ready(&self) -> bool {
        self.playback.lock().state == MediaState::Playing
    }

    pub fn pause(&self) -> bool {
        let mut playback = self.playback.lock();
        if playback.state == MediaState::Playing {
            playback.state = MediaState::Paused;
            true
        } else {
            false
        }
    }

    pub fn play(&self) -> bool {
        let mut playback = self.playback.lock();
        if playback.state == MediaState::Paused {
            playback.state = MediaState::Playing;
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> MediaState {
        self.playback.lock().state
    }

    pub fn set_use_frame_sync(&self, enable: bool) {
        self.playback.lock().use_frame_sync = enable;
    }

    pub fn is_frame_sync_enabled(&self) -> bool {
        self.playback.lock().use_frame_sync
    }

    pub fn set_link_rendering_to_frame_sync(&self, link: bool) {
        self.playback.lock().link_rendering_to_frame_sync = link;
    }

    pub fn is_rendering_linked_to_frame_sync(&self) -> bool {
        self.playback.lock().link_rendering_to_frame_sync
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.playback.lock().frame_rate
    }

    /// Timeout used by [`Self::wait_for_sync`]'s frame-sync wait.
    pub fn frame_sync_timeout(&self) -> Duration {
        self.config.frame_sync_timeout()
    }

    /// Size of the pending sample, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.pending.lock().as_ref().map(TextureSample::dimensions)
    }

    /// Source name without any rate hint. Empty when nothing is open.
    pub fn source_name(&self) -> String {
        self.playback
            .lock()
            .source
            .as_ref()
            .map(|s| s.base().to_string())
            .unwrap_or_default()
    }

    pub fn url(&self) -> Option<String> {
        self.playback.lock().url.clone()
    }

    /// Samples queued since creation.
    pub fn frames_delivered(&self) -> u64 {
        self.delivered.load(Ordering::Acquire)
    }

    /// Receiver contexts built since creation, first one included.
    pub fn contexts_built(&self) -> u64 {
        self.contexts_built.load(Ordering::Relaxed)
    }
}

impl<B: RenderBackend> Drop for ChannelSubscriber<B> {
    fn drop(&mut self) {
        if self.playback.get_mut().state != MediaState::Closed {
            self.close();
        }
    }
}
