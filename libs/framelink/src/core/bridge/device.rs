// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use crate::core::rhi::{ApiGeneration, RenderBackend};
use crate::core::Result;

/// Immediate-context device plus, when bridging generations, the
/// compatibility device bound to the host's queue.
pub struct BridgeDevice<B: RenderBackend> {
    device: B::Device,
    compat: Option<Arc<B::Compat>>,
    generation: ApiGeneration,
}

impl<B: RenderBackend> BridgeDevice<B> {
    /// Select the device for frames of `generation`.
    ///
    /// Immediate-context frames use the host device as-is. Explicit-queue
    /// frames need a compatibility device; failing to create one fails the
    /// whole bridge.
    pub fn open(backend: &B, generation: ApiGeneration) -> Result<Self> {
        let (device, compat) = match generation {
            ApiGeneration::ImmediateContext => (backend.open_immediate_device()?, None),
            ApiGeneration::ExplicitQueue => {
                let (device, compat) = backend.create_compat_device()?;
                (device, Some(Arc::new(compat)))
            }
        };

        tracing::debug!(
            api = backend.api_name(),
            %generation,
            "Opened bridge device"
        );

        Ok(Self {
            device,
            compat,
            generation,
        })
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn compat(&self) -> Option<&Arc<B::Compat>> {
        self.compat.as_ref()
    }

    pub fn generation(&self) -> ApiGeneration {
        self.generation
    }
}
