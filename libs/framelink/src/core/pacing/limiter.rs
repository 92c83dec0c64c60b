// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;
use std::time::Duration;

use crate::core::clocks::{Clock, SoftwareClock};

/// Sleeps below this are skipped; the OS cannot honour them.
const MIN_SLEEP: Duration = Duration::from_millis(1);

/// Blocking frame-rate hold for the producing thread.
///
/// Unlike [`super::FramePacer`], which refuses work, the limiter absorbs the
/// remainder of the frame interval by sleeping the caller.
pub struct FrameRateLimiter {
    clock: Arc<dyn Clock>,
    enabled: bool,
    target_fps: u32,
    last_frame_time: Option<f64>,
    frame_count: u64,
}

impl FrameRateLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SoftwareClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            enabled: true,
            target_fps: 60,
            last_frame_time: None,
            frame_count: 0,
        }
    }

    /// Sleep until one `1/fps` interval has passed since the previous hold,
    /// then stamp the frame. Returns how long the caller was held.
    ///
    /// Does nothing when disabled or when `fps` is zero.
    pub fn hold_fps(&mut self, fps: u32) -> Duration {
        if !self.enabled || fps == 0 {
            return Duration::ZERO;
        }

        self.target_fps = fps;
        let interval = 1.0 / fps as f64;

        let mut held = Duration::ZERO;
        if let Some(last) = self.last_frame_time {
            let elapsed = self.clock.now_secs() - last;
            if elapsed < interval {
                let wait = Duration::from_secs_f64(interval - elapsed);
                if wait > MIN_SLEEP {
                    std::thread::sleep(wait);
                    held = wait;
                }
            }
        }

        self.last_frame_time = Some(self.clock.now_secs());
        self.frame_count += 1;
        held
    }

    /// Stop holding and counting frames. There is no re-enable.
    pub fn disable(&mut self) {
        if self.enabled {
            tracing::debug!(frames = self.frame_count, "Frame rate control disabled");
        }
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clocks::ManualClock;

    #[test]
    fn test_first_hold_does_not_sleep() {
        let mut limiter = FrameRateLimiter::with_clock(Arc::new(ManualClock::new()));
        assert_eq!(limiter.hold_fps(30), Duration::ZERO);
        assert_eq!(limiter.frame_count(), 1);
        assert_eq!(limiter.target_fps(), 30);
    }

    #[test]
    fn test_behind_schedule_does_not_sleep() {
        let clock = Arc::new(ManualClock::new());
        let mut limiter = FrameRateLimiter::with_clock(clock.clone());

        limiter.hold_fps(60);
        clock.advance(Duration::from_millis(50));
        assert_eq!(limiter.hold_fps(60), Duration::ZERO);
        assert_eq!(limiter.frame_count(), 2);
    }

    #[test]
    fn test_ahead_of_schedule_sleeps_remainder() {
        let clock = Arc::new(ManualClock::new());
        let mut limiter = FrameRateLimiter::with_clock(clock.clone());

        limiter.hold_fps(50);
        clock.advance(Duration::from_millis(5));
        let held = limiter.hold_fps(50);
        assert!((held.as_secs_f64() - 0.015).abs() < 1e-6);
    }

    #[test]
    fn test_sub_millisecond_remainder_is_skipped() {
        let clock = Arc::new(ManualClock::new());
        let mut limiter = FrameRateLimiter::with_clock(clock.clone());

        limiter.hold_fps(100);
        clock.advance(Duration::from_micros(9_500));
        assert_eq!(limiter.hold_fps(100), Duration::ZERO);
    }

    #[test]
    fn test_disable_stops_counting() {
        let mut limiter = FrameRateLimiter::with_clock(Arc::new(ManualClock::new()));
        limiter.hold_fps(30);
        limiter.disable();

        assert!(!limiter.is_enabled());
        assert_eq!(limiter.hold_fps(30), Duration::ZERO);
        assert_eq!(limiter.frame_count(), 1);
    }

    #[test]
    fn test_zero_fps_is_ignored() {
        let mut limiter = FrameRateLimiter::with_clock(Arc::new(ManualClock::new()));
        assert_eq!(limiter.hold_fps(0), Duration::ZERO);
        assert_eq!(limiter.frame_count(), 0);
    }
}
