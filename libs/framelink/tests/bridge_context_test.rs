// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Sender and receiver bridge contexts against the software backend.

use std::sync::Arc;

use framelink::core::bridge::{ReceiverContext, SenderContext, SurfaceKey};
use framelink::core::discovery::{ChannelDirectory, InMemoryDirectory};
use framelink::core::rhi::{ApiGeneration, NativeTexture, ResourceState, SharedPixelFormat};
use framelink::software::SoftwareBackend;
use framelink::{ChannelName, FrameLinkError, FrameRate};

const BGRA: SharedPixelFormat = SharedPixelFormat::Bgra8Unorm;

fn directory() -> Arc<InMemoryDirectory> {
    Arc::new(InMemoryDirectory::new())
}

#[test]
fn test_wrapped_view_is_cached_per_resource() {
    let backend = SoftwareBackend::new(ApiGeneration::ExplicitQueue);
    let dir = directory();
    let resource = backend.create_queue_resource(32, 32, BGRA);
    let frame = NativeTexture::<SoftwareBackend>::ExplicitQueue(resource.clone());

    let mut sender = SenderContext::new(
        &backend,
        dir.clone(),
        ChannelName::parse("Cam"),
        SurfaceKey::new(32, 32, BGRA),
        &frame,
        FrameRate::fps(30),
    )
    .unwrap();

    assert!(sender.tick(&frame, 0.0).unwrap());
    assert!(sender.tick(&frame, 1.0).unwrap());

    let stats = backend.stats();
    assert_eq!(stats.wraps_created, 1);
    assert_eq!(stats.copies, 2);
    assert_eq!(stats.flushes, 2);
    assert_eq!(sender.cached_views(), 1);
    assert_eq!(resource.state(), ResourceState::CopySource);

    drop(sender);

    let stats = backend.stats();
    assert_eq!(stats.wraps_released, 1);
    assert_eq!(stats.double_releases, 0);
    assert_eq!(stats.compat_created, stats.compat_released);
    assert_eq!(stats.devices_created, stats.devices_released);
    assert_eq!(resource.state(), ResourceState::Present);
    assert!(dir.find("Cam").is_none());
}

#[test]
fn test_distinct_resources_get_distinct_views() {
    let backend = SoftwareBackend::new(ApiGeneration::ExplicitQueue);
    let a = NativeTexture::<SoftwareBackend>::ExplicitQueue(backend.create_queue_resource(8, 8, BGRA));
    let b = NativeTexture::<SoftwareBackend>::ExplicitQueue(backend.create_queue_resource(8, 8, BGRA));

    let mut sender = SenderContext::new(
        &backend,
        directory(),
        ChannelName::parse("Swap"),
        SurfaceKey::new(8, 8, BGRA),
        &a,
        FrameRate::fps(1),
    )
    .unwrap();

    sender.tick(&a, 0.0).unwrap();
    sender.tick(&b, 1.0).unwrap();
    sender.tick(&a, 2.0).unwrap();

    assert_eq!(sender.cached_views(), 2);
    assert_eq!(backend.stats().wraps_created, 2);
}

#[test]
fn test_paced_out_tick_does_no_gpu_work() {
    let backend = SoftwareBackend::new(ApiGeneration::ImmediateContext);
    let frame = NativeTexture::<SoftwareBackend>::Immediate(backend.create_texture(4, 4, BGRA));

    let mut sender = SenderContext::new(
        &backend,
        directory(),
        ChannelName::parse("Cam"),
        SurfaceKey::new(4, 4, BGRA),
        &frame,
        FrameRate::fps(30),
    )
    .unwrap();

    assert!(sender.tick(&frame, 0.0).unwrap());
    assert!(!sender.tick(&frame, 0.01).unwrap());
    assert!(sender.tick(&frame, 0.04).unwrap());
    assert_eq!(backend.stats().copies, 2);
}

#[test]
fn test_immediate_frames_reach_receiver() {
    let sender_backend = SoftwareBackend::new(ApiGeneration::ImmediateContext);
    let receiver_backend = sender_backend.sharing_adapter_with(ApiGeneration::ExplicitQueue);
    let dir = directory();

    let host_texture = sender_backend.create_texture(2, 2, BGRA);
    host_texture.fill(0xAB);
    let frame = NativeTexture::<SoftwareBackend>::Immediate(host_texture);

    let mut sender = SenderContext::new(
        &sender_backend,
        dir.clone(),
        ChannelName::parse("Cam|FPS=60"),
        SurfaceKey::new(2, 2, BGRA),
        &frame,
        FrameRate::DEFAULT,
    )
    .unwrap();
    assert!(sender.bridge().compat().is_none());
    sender.tick(&frame, 0.0).unwrap();

    let info = dir.find("Cam").unwrap();
    assert_eq!(info.handle, sender.handle());
    assert_eq!(info.format().unwrap(), BGRA);

    let receiver =
        ReceiverContext::new(&receiver_backend, SurfaceKey::new(2, 2, BGRA)).unwrap();
    assert!(receiver.compat().is_some());

    let sample = receiver.open_sample(info.handle, true, 1).unwrap();
    assert_eq!(sample.dimensions(), (2, 2));
    assert!(sample.is_srgb());
    assert_eq!(sample.texture().read_pixels(), vec![0xAB; 16]);
}

#[test]
fn test_explicit_frame_needs_compat_device() {
    let backend = SoftwareBackend::new(ApiGeneration::ImmediateContext);
    let seed = NativeTexture::<SoftwareBackend>::Immediate(backend.create_texture(4, 4, BGRA));
    let queued =
        NativeTexture::<SoftwareBackend>::ExplicitQueue(backend.create_queue_resource(4, 4, BGRA));

    let mut sender = SenderContext::new(
        &backend,
        directory(),
        ChannelName::parse("Cam"),
        SurfaceKey::new(4, 4, BGRA),
        &seed,
        FrameRate::DEFAULT,
    )
    .unwrap();

    assert!(matches!(
        sender.tick(&queued, 0.0),
        Err(FrameLinkError::Wrap(_))
    ));

    // The failed tick did not use up the pacing slot.
    assert_eq!(sender.pacer().last_served(), None);
    assert!(sender.tick(&seed, 0.0).unwrap());
    assert_eq!(backend.stats().copies, 1);
}

#[test]
fn test_compat_failure_fails_construction() {
    let backend = SoftwareBackend::new(ApiGeneration::ExplicitQueue);
    backend.adapter().set_fail_compat(true);
    let dir = directory();
    let frame =
        NativeTexture::<SoftwareBackend>::ExplicitQueue(backend.create_queue_resource(4, 4, BGRA));

    let result = SenderContext::new(
        &backend,
        dir.clone(),
        ChannelName::parse("Cam"),
        SurfaceKey::new(4, 4, BGRA),
        &frame,
        FrameRate::DEFAULT,
    );

    assert!(matches!(result, Err(FrameLinkError::DeviceCreation(_))));
    assert!(dir.channel_names().is_empty());
}

#[test]
fn test_name_collision_fails_construction() {
    let backend = SoftwareBackend::new(ApiGeneration::ImmediateContext);
    let dir = directory();
    let frame = NativeTexture::<SoftwareBackend>::Immediate(backend.create_texture(4, 4, BGRA));
    let key = SurfaceKey::new(4, 4, BGRA);

    let _first = SenderContext::new(
        &backend,
        dir.clone(),
        ChannelName::parse("Cam"),
        key,
        &frame,
        FrameRate::DEFAULT,
    )
    .unwrap();

    let second = SenderContext::new(
        &backend,
        dir.clone(),
        ChannelName::parse("Cam|FPS=30"),
        key,
        &frame,
        FrameRate::DEFAULT,
    );
    assert!(matches!(second, Err(FrameLinkError::Publish(_))));
}

#[test]
fn test_receiver_rejects_unknown_api() {
    let backend = SoftwareBackend::with_api_name("Vulkan");
    let result = ReceiverContext::new(&backend, SurfaceKey::new(4, 4, BGRA));
    assert!(matches!(result, Err(FrameLinkError::UnsupportedApi(_))));
    assert_eq!(backend.stats().devices_created, 0);
}

#[test]
fn test_receiver_keeps_one_view_per_handle() {
    let backend = SoftwareBackend::new(ApiGeneration::ImmediateContext);
    let dir = directory();
    let frame = NativeTexture::<SoftwareBackend>::Immediate(backend.create_texture(4, 4, BGRA));
    let key = SurfaceKey::new(4, 4, BGRA);

    let receiver = ReceiverContext::new(&backend, key).unwrap();
    assert!(receiver.matches(&key));
    assert!(!receiver.matches(&SurfaceKey::new(8, 4, BGRA)));

    let first = SenderContext::new(
        &backend,
        dir.clone(),
        ChannelName::parse("A"),
        key,
        &frame,
        FrameRate::DEFAULT,
    )
    .unwrap();

    let s1 = receiver.open_sample(first.handle(), false, 1).unwrap();
    let s2 = receiver.open_sample(first.handle(), false, 2).unwrap();
    assert_eq!(backend.stats().textures_opened, 1);
    drop((s1, s2));

    let second = SenderContext::new(
        &backend,
        dir,
        ChannelName::parse("B"),
        key,
        &frame,
        FrameRate::DEFAULT,
    )
    .unwrap();
    let _s3 = receiver.open_sample(second.handle(), false, 3).unwrap();

    let stats = backend.stats();
    assert_eq!(stats.textures_opened, 2);
    assert_eq!(stats.views_released, 1);
}
