// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::rhi::{CompatDevice, RenderBackend};
use crate::core::Result;

/// A wrapped cross-generation view. Dropping it returns the view to the
/// compatibility device, exactly once.
pub struct WrappedView<B: RenderBackend> {
    texture: B::Texture,
    compat: Arc<B::Compat>,
}

impl<B: RenderBackend> WrappedView<B> {
    pub fn new(texture: B::Texture, compat: Arc<B::Compat>) -> Self {
        Self { texture, compat }
    }

    pub fn texture(&self) -> &B::Texture {
        &self.texture
    }
}

impl<B: RenderBackend> Drop for WrappedView<B> {
    fn drop(&mut self) {
        self.compat.release_wrapped(&self.texture);
    }
}

/// A view held by a context's cache.
pub enum CachedView<B: RenderBackend> {
    /// Explicit-queue resource wrapped for the immediate device.
    Wrapped(WrappedView<B>),
    /// Shared surface opened from a handle.
    Opened(B::Texture),
}

impl<B: RenderBackend> CachedView<B> {
    pub fn texture(&self) -> &B::Texture {
        match self {
            Self::Wrapped(view) => view.texture(),
            Self::Opened(texture) => texture,
        }
    }
}

/// Per-context cache of views keyed by the identity of what they view.
///
/// Creation runs under the cache lock, so one key is never wrapped twice
/// concurrently. Dropping the cache drops every view.
pub struct ViewCache<K, B: RenderBackend> {
    views: Mutex<HashMap<K, CachedView<B>>>,
}

impl<K: Eq + Hash, B: RenderBackend> ViewCache<K, B> {
    pub fn new() -> Self {
        Self {
            views: Mutex::new(HashMap::new()),
        }
    }

    /// Texture cached under `key`, creating the view on a miss.
    pub fn get_or_try_insert_with<F>(&self, key: K, create: F) -> Result<B::Texture>
    where
        F: FnOnce() -> Result<CachedView<B>>,
    {
        let mut views = self.views.lock();
        if let Some(view) = views.get(&key) {
            return Ok(view.texture().clone());
        }

        let view = create()?;
        let texture = view.texture().clone();
        views.insert(key, view);
        Ok(texture)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.views.lock().contains_key(key)
    }

    pub fn clear(&self) {
        self.views.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.views.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.lock().is_empty()
    }
}

impl<K: Eq + Hash, B: RenderBackend> Default for ViewCache<K, B> {
    fn default() -> Self {
        Self::new()
    }
}
