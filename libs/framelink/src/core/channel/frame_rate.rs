// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Rational frame rate (`numerator / denominator` frames per second).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    /// 60 fps, the rate every endpoint starts from.
    pub const DEFAULT: FrameRate = FrameRate::new(60, 1);

    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Whole-number rate, e.g. `FrameRate::fps(30)` for 30/1.
    pub const fn fps(fps: u32) -> Self {
        Self::new(fps, 1)
    }

    /// Both components must be non-zero to describe a usable rate.
    pub fn is_valid(&self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Seconds between frames (`denominator / numerator`).
    pub fn interval_secs(&self) -> f64 {
        self.denominator as f64 / self.numerator as f64
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs())
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
