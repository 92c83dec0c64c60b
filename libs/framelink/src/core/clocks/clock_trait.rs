// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Clock trait - passive time reference for frame pacing.
//!
//! Clocks are queried, never scheduled: the pacer and the channel endpoints
//! ask for `now` and decide themselves whether to produce, sleep or skip.

use std::time::Duration;

/// Passive monotonic time source.
///
/// - `SoftwareClock`: wall-independent `Instant` elapsed time (default)
/// - `ManualClock`: externally advanced time (tests, host-driven timelines)
pub trait Clock: Send + Sync {
    /// Current time in nanoseconds since the clock's epoch. Monotonic.
    fn now_ns(&self) -> i64;

    /// Current time as Duration.
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_ns().max(0) as u64)
    }

    /// Current time in (fractional) seconds, the unit the pacer works in.
    fn now_secs(&self) -> f64 {
        self.now_ns() as f64 / 1_000_000_000.0
    }

    /// Human-readable clock description, used in logs.
    fn description(&self) -> &str;
}
