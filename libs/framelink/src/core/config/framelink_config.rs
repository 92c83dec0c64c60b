// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::channel::FrameRate;
use crate::core::pacing::PollBudget;
use crate::core::{FrameLinkError, Result};

/// Upper bound for the frame-sync wait timeout.
const MAX_FRAME_SYNC_TIMEOUT_MS: u32 = 1000;

/// Producer-side settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Channel name. May carry an `|FPS=` hint for receivers.
    pub sender_name: String,
    pub output_width: u32,
    pub output_height: u32,
    /// Rate at which frames are copied into the shared surface.
    pub frame_rate: FrameRate,
    /// Frames are driven from the host's render thread.
    pub link_to_render_thread: bool,
    /// Hold the producing thread to `frame_rate` on start.
    pub enable_frame_rate_control: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            sender_name: "FrameLink".to_string(),
            output_width: 1920,
            output_height: 1080,
            frame_rate: FrameRate::DEFAULT,
            link_to_render_thread: true,
            enable_frame_rate_control: true,
        }
    }
}

impl PublisherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.output_width == 0 || self.output_height == 0 {
            return Err(FrameLinkError::Configuration(format!(
                "output size {}x{} must be non-zero",
                self.output_width, self.output_height
            )));
        }
        if !self.frame_rate.is_valid() {
            return Err(FrameLinkError::Configuration(format!(
                "publisher frame rate {} must have non-zero components",
                self.frame_rate
            )));
        }
        Ok(())
    }
}

/// Consumer-side settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberConfig {
    /// Default source when none is given in the URL.
    pub source_name: String,
    pub srgb: bool,
    /// Used when the source name carries no rate hint.
    pub target_frame_rate: FrameRate,
    pub use_frame_sync: bool,
    pub frame_sync_timeout_ms: u32,
    pub link_rendering_to_frame_sync: bool,
    pub fallback_poll_iterations: u32,
    pub fallback_poll_interval_ms: u32,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            source_name: "Spout".to_string(),
            srgb: true,
            target_frame_rate: FrameRate::DEFAULT,
            use_frame_sync: false,
            frame_sync_timeout_ms: 100,
            link_rendering_to_frame_sync: false,
            fallback_poll_iterations: 1000,
            fallback_poll_interval_ms: 1,
        }
    }
}

impl SubscriberConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.target_frame_rate.is_valid() {
            return Err(FrameLinkError::Configuration(format!(
                "subscriber target frame rate {} must have non-zero components",
                self.target_frame_rate
            )));
        }
        Ok(())
    }

    /// Frame-sync wait timeout, clamped to one second.
    pub fn frame_sync_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_sync_timeout_ms.min(MAX_FRAME_SYNC_TIMEOUT_MS) as u64)
    }

    pub fn poll_budget(&self) -> PollBudget {
        PollBudget::new(
            self.fallback_poll_iterations,
            Duration::from_millis(self.fallback_poll_interval_ms as u64),
        )
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLinkConfig {
    pub publisher: PublisherConfig,
    pub subscriber: SubscriberConfig,
}

impl FrameLinkConfig {
    /// Conventional file name.
    pub const FILE_NAME: &'static str = "framelink.toml";

    /// Load and validate a config file. Missing or malformed files are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FrameLinkError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = Self::from_toml_str(&content).map_err(|e| {
            FrameLinkError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        tracing::info!("Loaded framelink config from {}", path.display());
        Ok(config)
    }

    /// Load a config file, falling back to defaults if it is missing or
    /// unusable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| FrameLinkError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FrameLinkError::Configuration(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.publisher.validate()?;
        self.subscriber.validate()
    }
}
