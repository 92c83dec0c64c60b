// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! OS-level shared handle for cross-process surface sharing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle another process can use to open a shared surface.
///
/// On Windows this is the DXGI shared handle value; other backends hand out
/// their own namespace of ids. Zero is never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SharedHandle(u64);

impl SharedHandle {
    pub const NULL: SharedHandle = SharedHandle(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SharedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
