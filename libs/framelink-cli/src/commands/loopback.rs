// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use framelink::software::AdapterStats;
use framelink::{
    ApiGeneration, ChannelName, ChannelPublisher, ChannelSubscriber, FrameRate, InMemoryDirectory,
    LocalEventNamespace, ManualClock, NativeTexture, PublisherConfig, RenderThread,
    SharedPixelFormat, SoftwareBackend, SubscriberConfig, SyncRegistry, SUBSCRIBE_SCHEME,
};

const FORMAT: SharedPixelFormat = SharedPixelFormat::Bgra8Unorm;
const SYNC_TIMEOUT: Duration = Duration::from_millis(50);

pub struct LoopbackArgs {
    pub name: String,
    pub frames: u32,
    pub width: u32,
    pub height: u32,
    pub sender_api: Option<String>,
    pub receiver_api: String,
    pub host_fps: u32,
    pub json: bool,
}

/// Publish `frames` host frames and receive them in the same process.
pub fn run(args: LoopbackArgs) -> Result<()> {
    if args.host_fps == 0 {
        anyhow::bail!("--host-fps must be non-zero");
    }

    let sender_generation = ApiGeneration::resolve(
        args.sender_api
            .as_deref()
            .map(str::parse)
            .transpose()
            .context("Invalid --sender-api")?,
    );
    let receiver_generation: ApiGeneration =
        args.receiver_api.parse().context("Invalid --receiver-api")?;

    let channel = ChannelName::parse(args.name.clone());
    let rate = channel.rate_hint().unwrap_or(FrameRate::DEFAULT);

    let sender_backend = Arc::new(SoftwareBackend::new(sender_generation));
    let receiver_backend = Arc::new(sender_backend.sharing_adapter_with(receiver_generation));
    let directory = Arc::new(InMemoryDirectory::new());
    let namespace = LocalEventNamespace::new();
    let clock = Arc::new(ManualClock::new());
    let render = Arc::new(RenderThread::spawn("framelink-loopback-render")?);

    let mut publisher = ChannelPublisher::new(
        sender_backend.clone(),
        directory.clone(),
        Arc::new(SyncRegistry::with_namespace(Arc::new(namespace.clone()))),
        PublisherConfig {
            sender_name: args.name.clone(),
            output_width: args.width,
            output_height: args.height,
            frame_rate: rate,
            enable_frame_rate_control: false,
            ..Default::default()
        },
    )
    .with_clock(clock.clone());

    let subscriber = ChannelSubscriber::new(
        receiver_backend,
        directory,
        Arc::new(SyncRegistry::with_namespace(Arc::new(namespace))),
        render,
        SubscriberConfig {
            use_frame_sync: true,
            ..Default::default()
        },
    );

    publisher.start()?;
    let url = format!("{}://{}", SUBSCRIBE_SCHEME, args.name);
    if !subscriber.open(&url) {
        anyhow::bail!("Subscriber rejected {}", url);
    }

    println!(
        "Loopback '{}': {} -> {}, {}x{} at {} (host {} fps)",
        channel.base(),
        sender_generation,
        receiver_generation,
        args.width,
        args.height,
        rate,
        args.host_fps
    );

    let mut received = 0u32;
    let mut mismatched = 0u32;

    // One host render target, redrawn every frame, the way a swap chain
    // buffer would be.
    let frame = match sender_generation {
        ApiGeneration::ImmediateContext => NativeTexture::Immediate(
            sender_backend.create_texture(args.width, args.height, FORMAT),
        ),
        ApiGeneration::ExplicitQueue => NativeTexture::ExplicitQueue(
            sender_backend.create_queue_resource(args.width, args.height, FORMAT),
        ),
    };

    for index in 0..args.frames {
        clock.set_secs(index as f64 / args.host_fps as f64);
        let marker = (index % 256) as u8;
        fill_frame(&frame, marker);

        if !publisher.on_frame(&frame, args.width, args.height, FORMAT)? {
            continue;
        }

        let synced = subscriber.wait_for_frame_sync(SYNC_TIMEOUT);
        if !subscriber.tick_fetch()? {
            tracing::warn!(frame = index, "Published frame was not received");
            continue;
        }

        if let Some(sample) = subscriber.fetch_video() {
            let pixels = sample.texture().read_pixels();
            if pixels.iter().any(|&byte| byte != marker) {
                mismatched += 1;
            }
            received += 1;
            println!(
                "  frame {:>4}  seq {:>4}  synced {}",
                index,
                sample.sequence(),
                synced
            );
        }
    }

    println!(
        "Published {} of {} frames, received {}, {} with unexpected content",
        publisher.frames_published(),
        args.frames,
        received,
        mismatched
    );

    subscriber.close();
    publisher.stop();

    print_stats(&sender_backend.stats(), args.json)?;
    Ok(())
}

fn fill_frame(frame: &NativeTexture<SoftwareBackend>, value: u8) {
    match frame {
        NativeTexture::Immediate(texture) => texture.fill(value),
        NativeTexture::ExplicitQueue(resource) => resource.fill(value),
    }
}

fn print_stats(stats: &AdapterStats, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("Adapter:");
    println!(
        "  devices   {} created, {} released",
        stats.devices_created, stats.devices_released
    );
    println!(
        "  compat    {} created, {} released",
        stats.compat_created, stats.compat_released
    );
    println!(
        "  wraps     {} created, {} released, {} double releases",
        stats.wraps_created, stats.wraps_released, stats.double_releases
    );
    println!(
        "  views     {} opened, {} released",
        stats.textures_opened, stats.views_released
    );
    println!(
        "  surfaces  {} shared, {} copies, {} flushes",
        stats.shared_textures, stats.copies, stats.flushes
    );
    Ok(())
}
