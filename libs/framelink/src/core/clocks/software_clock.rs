// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::Clock;
use std::time::Instant;

/// Monotonic clock counting from its own creation.
pub struct SoftwareClock {
    start_time: Instant,
    description: String,
}

impl SoftwareClock {
    pub fn new() -> Self {
        Self::with_description("Software Clock".to_string())
    }

    pub fn with_description(description: String) -> Self {
        Self {
            start_time: Instant::now(),
            description,
        }
    }

    pub fn reset(&mut self) {
        self.start_time = Instant::now();
    }
}

impl Default for SoftwareClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SoftwareClock {
    fn now_ns(&self) -> i64 {
        self.start_time.elapsed().as_nanos() as i64
    }

    fn description(&self) -> &str {
        &self.description
    }
}
