// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Channel discovery: the directory senders publish into and receivers query.
//!
//! The directory is an explicitly passed collaborator. A process that talks to
//! a system-wide sharing service implements [`ChannelDirectory`] over it; the
//! in-process [`InMemoryDirectory`] covers loopback use and tests.

mod directory;
mod memory;

pub use directory::{ChannelDirectory, ChannelInfo, ChannelPublication};
pub use memory::InMemoryDirectory;
