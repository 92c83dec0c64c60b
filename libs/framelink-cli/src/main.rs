// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! FrameLink CLI
//!
//! Inspect channel names and configuration, and run software loopbacks.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "framelink")]
#[command(author, version, about = "FrameLink channel CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a channel name is split and which sync event it uses
    Name {
        /// Channel name, optionally with a `|FPS=` hint
        name: String,
    },

    /// Run a publisher and subscriber against the software backend
    Loopback {
        /// Sender name
        #[arg(long, default_value = "FrameLink|FPS=30")]
        name: String,

        /// Frames to offer the publisher
        #[arg(short = 'n', long, default_value = "10")]
        frames: u32,

        #[arg(long, default_value = "64")]
        width: u32,

        #[arg(long, default_value = "64")]
        height: u32,

        /// Publisher host API (d3d11, d3d12); falls back to FRAMELINK_RHI_BACKEND
        #[arg(long)]
        sender_api: Option<String>,

        /// Subscriber host API (d3d11, d3d12)
        #[arg(long, default_value = "d3d11")]
        receiver_api: String,

        /// Host frame rate the publisher is offered frames at
        #[arg(long, default_value = "60")]
        host_fps: u32,

        /// Print adapter statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Config file (default: ./framelink.toml if present)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Fail instead of falling back to defaults when the file is unreadable
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    framelink::core::logging::init_logging("info");

    match cli.command {
        Commands::Name { name } => commands::name::run(&name),
        Commands::Loopback {
            name,
            frames,
            width,
            height,
            sender_api,
            receiver_api,
            host_fps,
            json,
        } => commands::loopback::run(commands::loopback::LoopbackArgs {
            name,
            frames,
            width,
            height,
            sender_api,
            receiver_api,
            host_fps,
            json,
        }),
        Commands::Config { path, strict } => commands::config::run(path, strict),
    }
}
