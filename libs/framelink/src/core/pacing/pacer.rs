// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::time::Duration;

use crate::core::channel::FrameRate;

/// Token bucket of one: decides whether a frame may be produced now.
///
/// Time is passed in by the caller, so the pacer never reads a clock and
/// never blocks.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval_secs: f64,
    /// `None` until the first frame is served.
    last_served: Option<f64>,
}

impl FramePacer {
    pub fn new(rate: FrameRate) -> Self {
        let mut pacer = Self::default();
        pacer.set_frame_rate(rate);
        pacer
    }

    /// Set the interval to `denominator / numerator` seconds. Invalid rates
    /// are ignored and the previous interval stays in effect.
    pub fn set_target_rate(&mut self, numerator: u32, denominator: u32) {
        self.set_frame_rate(FrameRate::new(numerator, denominator));
    }

    pub fn set_frame_rate(&mut self, rate: FrameRate) {
        if !rate.is_valid() {
            tracing::warn!(%rate, "Ignoring invalid target frame rate");
            return;
        }
        self.interval_secs = rate.interval_secs();
    }

    /// Whether at least one interval has elapsed since the last served frame.
    pub fn is_due(&self, now_secs: f64) -> bool {
        match self.last_served {
            None => true,
            Some(last) => now_secs - last >= self.interval_secs,
        }
    }

    /// Record a frame served at `now`. Time never moves backwards.
    pub fn mark_served(&mut self, now_secs: f64) {
        self.last_served = Some(match self.last_served {
            Some(last) => now_secs.max(last),
            None => now_secs,
        });
    }

    /// `true` and record `now` as served iff the pacer is due. A `false`
    /// leaves state untouched.
    pub fn should_produce_now(&mut self, now_secs: f64) -> bool {
        let due = self.is_due(now_secs);
        if due {
            self.mark_served(now_secs);
        }
        due
    }

    /// How long until `should_produce_now` would next return `true`.
    pub fn time_until_next(&self, now_secs: f64) -> Duration {
        match self.last_served {
            None => Duration::ZERO,
            Some(last) => {
                let remaining = last + self.interval_secs - now_secs;
                if remaining > 0.0 {
                    Duration::from_secs_f64(remaining)
                } else {
                    Duration::ZERO
                }
            }
        }
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    pub fn last_served(&self) -> Option<f64> {
        self.last_served
    }

    /// Forget the last served frame; the next call produces.
    pub fn reset(&mut self) {
        self.last_served = None;
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self {
            interval_secs: FrameRate::DEFAULT.interval_secs(),
            last_served: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_60hz() {
        let pacer = FramePacer::default();
        assert!((pacer.interval_secs() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_call_produces() {
        let mut pacer = FramePacer::new(FrameRate::fps(30));
        assert!(pacer.should_produce_now(0.0));
        assert_eq!(pacer.last_served(), Some(0.0));
    }

    #[test]
    fn test_thirty_fps_schedule() {
        let mut pacer = FramePacer::default();
        pacer.set_target_rate(30, 1);

        assert!(pacer.should_produce_now(0.0));
        assert!(!pacer.should_produce_now(0.01));
        // A refusal must not move the reference point.
        assert_eq!(pacer.last_served(), Some(0.0));
        assert!(pacer.should_produce_now(0.04));
        assert_eq!(pacer.last_served(), Some(0.04));
    }

    #[test]
    fn test_produced_frames_are_at_least_one_interval_apart() {
        let mut pacer = FramePacer::new(FrameRate::fps(60));
        let interval = pacer.interval_secs();

        let mut produced = Vec::new();
        for step in 0..1000 {
            let now = step as f64 * 0.0031;
            if pacer.should_produce_now(now) {
                produced.push(now);
            }
        }

        assert!(produced.len() > 10);
        for pair in produced.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }

    #[test]
    fn test_invalid_rate_is_ignored() {
        let mut pacer = FramePacer::new(FrameRate::fps(25));
        pacer.set_target_rate(0, 1);
        pacer.set_target_rate(30, 0);
        assert!((pacer.interval_secs() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_time_until_next() {
        let mut pacer = FramePacer::new(FrameRate::fps(10));
        assert_eq!(pacer.time_until_next(0.0), Duration::ZERO);

        pacer.should_produce_now(1.0);
        let wait = pacer.time_until_next(1.04);
        assert!((wait.as_secs_f64() - 0.06).abs() < 1e-9);
        assert_eq!(pacer.time_until_next(2.0), Duration::ZERO);
    }

    #[test]
    fn test_is_due_does_not_consume() {
        let mut pacer = FramePacer::new(FrameRate::fps(10));
        assert!(pacer.is_due(0.0));
        assert!(pacer.is_due(0.0));
        assert_eq!(pacer.last_served(), None);

        pacer.mark_served(0.0);
        assert!(!pacer.is_due(0.05));
        assert!(pacer.is_due(0.1));

        pacer.mark_served(-1.0);
        assert_eq!(pacer.last_served(), Some(0.0));
    }

    #[test]
    fn test_reset() {
        let mut pacer = FramePacer::new(FrameRate::fps(1));
        assert!(pacer.should_produce_now(5.0));
        assert!(!pacer.should_produce_now(5.5));

        pacer.reset();
        assert!(pacer.should_produce_now(5.5));
    }
}
