// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameLinkError {
    #[error("Device creation failed: {0}")]
    DeviceCreation(String),

    #[error("Unsupported graphics API: {0}")]
    UnsupportedApi(String),

    #[error("Unsupported pixel format (native code {0})")]
    UnsupportedFormat(u32),

    #[error("Channel publish failed: {0}")]
    Publish(String),

    #[error("Resource wrap failed: {0}")]
    Wrap(String),

    #[error("GPU operation failed: {0}")]
    Gpu(String),

    #[error("Frame sync error: {0}")]
    Sync(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FrameLinkError>;
