// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Graphics-API generation detection and selection.
//!
//! The generation can be selected at runtime via:
//! 1. Explicit parameter passed to `ApiGeneration::resolve()`
//! 2. `FRAMELINK_RHI_BACKEND` environment variable
//! 3. Platform default (explicit-queue)

use std::fmt;
use std::str::FromStr;

use crate::core::{FrameLinkError, Result};

/// Which generation of graphics API a device or resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiGeneration {
    /// Older API with an immediate device context (Direct3D 11).
    ImmediateContext,
    /// Newer API with explicit command queues (Direct3D 12).
    ExplicitQueue,
}

impl ApiGeneration {
    /// Environment variable name for the generation override.
    pub const ENV_VAR: &'static str = "FRAMELINK_RHI_BACKEND";

    /// Map a host RHI name to its generation.
    ///
    /// Unknown names fail: there is no safe compatibility path to guess.
    pub fn from_api_name(name: &str) -> Result<Self> {
        match name {
            "D3D11" | "immediate" => Ok(Self::ImmediateContext),
            "D3D12" | "explicit-queue" => Ok(Self::ExplicitQueue),
            other => Err(FrameLinkError::UnsupportedApi(other.to_string())),
        }
    }

    /// Resolution priority: explicit value, `FRAMELINK_RHI_BACKEND`, default.
    pub fn resolve(explicit: Option<Self>) -> Self {
        if let Some(generation) = explicit {
            return generation;
        }

        if let Ok(env_value) = std::env::var(Self::ENV_VAR) {
            match env_value.parse() {
                Ok(generation) => return generation,
                Err(e) => tracing::warn!(
                    "Ignoring {}={:?}: {}",
                    Self::ENV_VAR,
                    env_value,
                    e
                ),
            }
        }

        Self::ExplicitQueue
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImmediateContext => "immediate",
            Self::ExplicitQueue => "explicit-queue",
        }
    }
}

impl FromStr for ApiGeneration {
    type Err = FrameLinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "d3d11" | "immediate" => Ok(Self::ImmediateContext),
            "d3d12" | "explicit-queue" | "explicit" => Ok(Self::ExplicitQueue),
            _ => Err(FrameLinkError::UnsupportedApi(s.to_string())),
        }
    }
}

impl fmt::Display for ApiGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_name() {
        assert_eq!(
            ApiGeneration::from_api_name("D3D11").unwrap(),
            ApiGeneration::ImmediateContext
        );
        assert_eq!(
            ApiGeneration::from_api_name("D3D12").unwrap(),
            ApiGeneration::ExplicitQueue
        );
    }

    #[test]
    fn test_unknown_api_fails_fast() {
        for name in ["Vulkan", "Metal", "d3d12", ""] {
            assert!(matches!(
                ApiGeneration::from_api_name(name),
                Err(FrameLinkError::UnsupportedApi(_))
            ));
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(
            "D3D12".parse::<ApiGeneration>().unwrap(),
            ApiGeneration::ExplicitQueue
        );
        assert_eq!(
            "Immediate".parse::<ApiGeneration>().unwrap(),
            ApiGeneration::ImmediateContext
        );
        assert!("opengl".parse::<ApiGeneration>().is_err());
    }

    #[test]
    fn test_explicit_wins() {
        assert_eq!(
            ApiGeneration::resolve(Some(ApiGeneration::ImmediateContext)),
            ApiGeneration::ImmediateContext
        );
    }
}
