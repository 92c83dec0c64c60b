// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Linux backends.

mod posix_event;

pub use posix_event::PosixEventNamespace;
