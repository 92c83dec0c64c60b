// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! CPU-memory reference backend.
//!
//! Surfaces live in host memory and shared handles are valid within one
//! [`SoftwareAdapter`]. Sender and receiver backends that share an adapter
//! behave like two processes on one GPU. The adapter counts every device,
//! view and wrap so lifetime rules can be checked.

mod adapter;
mod backend;
mod texture;

pub use adapter::{AdapterStats, SoftwareAdapter};
pub use backend::{SoftwareBackend, SoftwareCompat, SoftwareDevice};
pub use texture::{SoftwareQueueResource, SoftwareTexture};
