// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Publisher and subscriber settings, loadable from `framelink.toml`.

mod framelink_config;

pub use framelink_config::{FrameLinkConfig, PublisherConfig, SubscriberConfig};
