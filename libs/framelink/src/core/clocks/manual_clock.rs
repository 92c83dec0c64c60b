// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::Clock;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Clock advanced explicitly by its owner.
///
/// Used where the timeline is driven from outside (a host engine's frame
/// time) and in tests that need exact pacing decisions.
pub struct ManualClock {
    now_ns: AtomicI64,
    description: String,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now_ns: AtomicI64::new(0),
            description: "Manual Clock".to_string(),
        }
    }

    /// Jump to an absolute time. Going backwards is ignored.
    pub fn set_secs(&self, secs: f64) {
        let target = (secs * 1_000_000_000.0).round() as i64;
        self.now_ns.fetch_max(target, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Duration) {
        self.now_ns
            .fetch_add(delta.as_nanos() as i64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> i64 {
        self.now_ns.load(Ordering::SeqCst)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_ns(), 0);

        clock.advance(Duration::from_millis(10));
        assert_eq!(clock.now_ns(), 10_000_000);

        clock.set_secs(0.04);
        assert!((clock.now_secs() - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_manual_clock_never_goes_backwards() {
        let clock = ManualClock::new();
        clock.set_secs(1.0);
        clock.set_secs(0.5);
        assert!((clock.now_secs() - 1.0).abs() < 1e-9);
    }
}
