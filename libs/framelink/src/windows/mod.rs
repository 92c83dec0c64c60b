// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Windows backends: Direct3D 11 / 11-on-12 bridge and Win32 named events.

mod d3d;
mod event;

pub use d3d::{D3dBackend, D3dCompat, D3dDevice, D3dHostDevice, D3dQueueResource, D3dTexture};
pub use event::Win32EventNamespace;
