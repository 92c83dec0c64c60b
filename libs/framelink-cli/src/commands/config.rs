// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::path::PathBuf;

use anyhow::{Context, Result};
use framelink::FrameLinkConfig;

/// Print the configuration that would be used.
pub fn run(path: Option<PathBuf>, strict: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(FrameLinkConfig::FILE_NAME));

    let config = if strict {
        FrameLinkConfig::load(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        FrameLinkConfig::load_or_default(&path)
    };

    let rendered = config
        .to_toml_string()
        .context("Failed to render configuration")?;

    println!("# {}", path.display());
    print!("{}", rendered);
    Ok(())
}
