// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use anyhow::Result;
use framelink::ChannelName;

/// Print the parts of a channel name.
pub fn run(raw: &str) -> Result<()> {
    let name = ChannelName::parse(raw);

    if name.is_empty() {
        println!("Channel name is empty; nothing would be published.");
        return Ok(());
    }

    println!("Channel:     {}", name);
    println!("  Base name: {}", name.base());
    match name.rate_hint() {
        Some(rate) => println!("  Rate hint: {} ({:.3} fps)", rate, rate.as_f64()),
        None => println!("  Rate hint: none"),
    }
    println!("  Sync event: {}", name.sync_object_name());

    Ok(())
}
