// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Channel identity: names, rate hints and frame rates.

mod frame_rate;
mod name;

pub use frame_rate::FrameRate;
pub use name::{
    base_name, parse_rate_hint, sync_object_name, ChannelName, RATE_HINT_SEPARATOR,
    SYNC_EVENT_PREFIX,
};
