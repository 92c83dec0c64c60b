// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Frame pacing: the producer-side rate gate, the blocking frame-rate hold
//! and the bounded polling fallback used when no frame-sync signal arrives.

mod limiter;
mod pacer;
mod poll;

pub use limiter::FrameRateLimiter;
pub use pacer::FramePacer;
pub use poll::{poll_for_new_frame, PollBudget};
