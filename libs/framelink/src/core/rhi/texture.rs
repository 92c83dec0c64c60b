// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Generation-tagged texture handles.

use std::fmt;

use super::backend::ApiGeneration;
use super::device::RenderBackend;

/// Stable identity of a native resource, used as a cache key.
///
/// For COM-backed resources this is the interface pointer value; it stays
/// valid as long as the resource is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res#{:x}", self.0)
    }
}

/// Resources that can report a stable identity.
pub trait ResourceIdentity {
    fn resource_id(&self) -> ResourceId;
}

/// GPU state a wrapped resource is declared to be in.
///
/// A wrap names two states: the one the resource is in while the immediate
/// device uses it, and the one it is returned in on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    Common,
    Present,
    CopySource,
    CopyDest,
    PixelShaderResource,
}

/// A frame texture as handed in by the host, tagged with the API generation
/// that allocated it.
pub enum NativeTexture<B: RenderBackend> {
    /// Already consumable by the immediate-context device.
    Immediate(B::Texture),
    /// Owned by an explicit-queue device; must be wrapped before use.
    ExplicitQueue(B::QueueResource),
}

impl<B: RenderBackend> NativeTexture<B> {
    pub fn generation(&self) -> ApiGeneration {
        match self {
            Self::Immediate(_) => ApiGeneration::ImmediateContext,
            Self::ExplicitQueue(_) => ApiGeneration::ExplicitQueue,
        }
    }
}

impl<B: RenderBackend> Clone for NativeTexture<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Immediate(texture) => Self::Immediate(texture.clone()),
            Self::ExplicitQueue(resource) => Self::ExplicitQueue(resource.clone()),
        }
    }
}

impl<B: RenderBackend> fmt::Debug for NativeTexture<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(_) => f.write_str("NativeTexture::Immediate"),
            Self::ExplicitQueue(resource) => {
                write!(f, "NativeTexture::ExplicitQueue({})", resource.resource_id())
            }
        }
    }
}
