// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pixel formats a shared surface may carry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{FrameLinkError, Result};

/// Closed set of shared-surface formats.
///
/// Native codes are DXGI format values, which is what discovery reports and
/// what every endpoint of the sharing protocol agrees on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SharedPixelFormat {
    /// 8-bit BGRA, unsigned normalized.
    Bgra8Unorm,
    /// 16-bit float RGBA.
    Rgba16Float,
    /// 32-bit float RGBA.
    Rgba32Float,
}

impl SharedPixelFormat {
    pub const DXGI_B8G8R8A8_UNORM: u32 = 87;
    pub const DXGI_R16G16B16A16_FLOAT: u32 = 10;
    pub const DXGI_R32G32B32A32_FLOAT: u32 = 2;

    /// Map a native format code. Anything outside the closed set is an
    /// error, never a coercion.
    pub fn from_native_code(code: u32) -> Result<Self> {
        match code {
            Self::DXGI_B8G8R8A8_UNORM => Ok(Self::Bgra8Unorm),
            Self::DXGI_R16G16B16A16_FLOAT => Ok(Self::Rgba16Float),
            Self::DXGI_R32G32B32A32_FLOAT => Ok(Self::Rgba32Float),
            other => Err(FrameLinkError::UnsupportedFormat(other)),
        }
    }

    pub fn native_code(&self) -> u32 {
        match self {
            Self::Bgra8Unorm => Self::DXGI_B8G8R8A8_UNORM,
            Self::Rgba16Float => Self::DXGI_R16G16B16A16_FLOAT,
            Self::Rgba32Float => Self::DXGI_R32G32B32A32_FLOAT,
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::Bgra8Unorm => 4,
            Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
        }
    }

    /// Byte size of a tightly packed `width` x `height` image.
    pub fn image_size(&self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.bytes_per_pixel() as usize
    }
}

impl fmt::Display for SharedPixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bgra8Unorm => "BGRA8",
            Self::Rgba16Float => "RGBA16F",
            Self::Rgba32Float => "RGBA32F",
        };
        f.write_str(name)
    }
}

impl TryFrom<u32> for SharedPixelFormat {
    type Error = FrameLinkError;

    fn try_from(code: u32) -> Result<Self> {
        Self::from_native_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_codes_map_both_ways() {
        for format in [
            SharedPixelFormat::Bgra8Unorm,
            SharedPixelFormat::Rgba16Float,
            SharedPixelFormat::Rgba32Float,
        ] {
            assert_eq!(
                SharedPixelFormat::from_native_code(format.native_code()).unwrap(),
                format
            );
        }
    }

    #[test]
    fn test_unknown_code_is_unsupported() {
        // DXGI_FORMAT_R8G8B8A8_UNORM is deliberately outside the set.
        let err = SharedPixelFormat::from_native_code(28).unwrap_err();
        assert!(matches!(err, FrameLinkError::UnsupportedFormat(28)));
        assert!(SharedPixelFormat::try_from(0).is_err());
    }

    #[test]
    fn test_image_size() {
        assert_eq!(SharedPixelFormat::Bgra8Unorm.image_size(64, 64), 64 * 64 * 4);
        assert_eq!(SharedPixelFormat::Rgba32Float.image_size(2, 3), 2 * 3 * 16);
    }
}
