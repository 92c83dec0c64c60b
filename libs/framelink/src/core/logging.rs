// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Process-wide tracing setup for binaries and tests.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, or by `default_filter`
/// when the variable is unset or invalid.
///
/// Returns `false` if a global subscriber was already installed, which is
/// not an error: the existing one keeps receiving events.
pub fn init_logging(default_filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(default_filter, "Logging initialized");
    }
    installed
}
