// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Direct3D bridge backend.
//!
//! D3D11 hosts use their own device. D3D12 hosts get a D3D11-on-12 device
//! created on the host's command queue, and their frames are wrapped as
//! D3D11 resources through `ID3D11On12Device`.

use std::ffi::c_void;

use ::windows::core::{Interface, IUnknown};
use ::windows::Win32::Foundation::HANDLE;
use ::windows::Win32::Graphics::Direct3D11::{
    ID3D11Device, ID3D11DeviceContext, ID3D11Resource, ID3D11Texture2D,
    D3D11_BIND_RENDER_TARGET, D3D11_BIND_SHADER_RESOURCE, D3D11_CREATE_DEVICE_BGRA_SUPPORT,
    D3D11_RESOURCE_MISC_SHARED, D3D11_TEXTURE2D_DESC, D3D11_USAGE_DEFAULT,
};
use ::windows::Win32::Graphics::Direct3D11on12::{
    D3D11On12CreateDevice, ID3D11On12Device, D3D11_RESOURCE_FLAGS,
};
use ::windows::Win32::Graphics::Direct3D12::{
    ID3D12CommandQueue, ID3D12Device, ID3D12Resource, D3D12_RESOURCE_STATES,
    D3D12_RESOURCE_STATE_COMMON, D3D12_RESOURCE_STATE_COPY_DEST,
    D3D12_RESOURCE_STATE_COPY_SOURCE, D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE,
    D3D12_RESOURCE_STATE_PRESENT,
};
use ::windows::Win32::Graphics::Dxgi::Common::{DXGI_FORMAT, DXGI_SAMPLE_DESC};
use ::windows::Win32::Graphics::Dxgi::IDXGIResource;

use crate::core::rhi::{
    CompatDevice, ImmediateDevice, RenderBackend, ResourceId, ResourceIdentity, ResourceState,
    SharedHandle, SharedPixelFormat,
};
use crate::core::{FrameLinkError, Result};

fn gpu_error(what: &'static str) -> impl FnOnce(::windows::core::Error) -> FrameLinkError {
    move |e| FrameLinkError::Gpu(format!("{}: {}", what, e))
}

fn d3d12_state(state: ResourceState) -> D3D12_RESOURCE_STATES {
    match state {
        ResourceState::Common => D3D12_RESOURCE_STATE_COMMON,
        ResourceState::Present => D3D12_RESOURCE_STATE_PRESENT,
        ResourceState::CopySource => D3D12_RESOURCE_STATE_COPY_SOURCE,
        ResourceState::CopyDest => D3D12_RESOURCE_STATE_COPY_DEST,
        ResourceState::PixelShaderResource => D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE,
    }
}

/// D3D11 texture usable by the bridge's immediate context.
#[derive(Clone)]
pub struct D3dTexture(pub ID3D11Texture2D);

// SAFETY: D3D11 resources are free-threaded; only device contexts are not,
// and those never leave `D3dDevice`.
unsafe impl Send for D3dTexture {}
unsafe impl Sync for D3dTexture {}

/// D3D12 resource as handed over by a D3D12 host.
#[derive(Clone)]
pub struct D3dQueueResource(pub ID3D12Resource);

// SAFETY: D3D12 resources are free-threaded.
unsafe impl Send for D3dQueueResource {}
unsafe impl Sync for D3dQueueResource {}

impl ResourceIdentity for D3dQueueResource {
    fn resource_id(&self) -> ResourceId {
        ResourceId(self.0.as_raw() as usize as u64)
    }
}

/// The host's native device.
#[derive(Clone)]
pub enum D3dHostDevice {
    D3D11(ID3D11Device),
    D3D12 {
        device: ID3D12Device,
        queue: ID3D12CommandQueue,
    },
}

pub struct D3dBackend {
    host: D3dHostDevice,
}

// SAFETY: D3D11 and D3D12 devices are free-threaded.
unsafe impl Send for D3dBackend {}
unsafe impl Sync for D3dBackend {}

impl D3dBackend {
    pub fn new(host: D3dHostDevice) -> Self {
        Self { host }
    }
}

impl RenderBackend for D3dBackend {
    type Texture = D3dTexture;
    type QueueResource = D3dQueueResource;
    type Device = D3dDevice;
    type Compat = D3dCompat;

    fn api_name(&self) -> &str {
        match self.host {
            D3dHostDevice::D3D11(_) => "D3D11",
            D3dHostDevice::D3D12 { .. } => "D3D12",
        }
    }

    fn open_immediate_device(&self) -> Result<D3dDevice> {
        let D3dHostDevice::D3D11(device) = &self.host else {
            return Err(FrameLinkError::DeviceCreation(
                "host renders with D3D12; an immediate device needs D3D11-on-12".into(),
            ));
        };

        let context = unsafe { device.GetImmediateContext() }
            .map_err(|e| FrameLinkError::DeviceCreation(format!("GetImmediateContext: {}", e)))?;

        Ok(D3dDevice {
            device: device.clone(),
            context,
        })
    }

    fn create_compat_device(&self) -> Result<(D3dDevice, D3dCompat)> {
        let D3dHostDevice::D3D12 { device, queue } = &self.host else {
            return Err(FrameLinkError::DeviceCreation(
                "D3D11-on-12 requires a D3D12 host device".into(),
            ));
        };

        let queue: IUnknown = queue
            .cast()
            .map_err(|e| FrameLinkError::DeviceCreation(format!("command queue: {}", e)))?;
        let queues = [Some(queue)];

        let mut device11: Option<ID3D11Device> = None;
        let mut context: Option<ID3D11DeviceContext> = None;
        unsafe {
            D3D11On12CreateDevice(
                device,
                D3D11_CREATE_DEVICE_BGRA_SUPPORT.0 as u32,
                None,
                Some(queues.as_slice()),
                0,
                Some(&mut device11),
                Some(&mut context),
                None,
            )
        }
        .map_err(|e| FrameLinkError::DeviceCreation(format!("D3D11On12CreateDevice: {}", e)))?;

        let (Some(device11), Some(context)) = (device11, context) else {
            return Err(FrameLinkError::DeviceCreation(
                "D3D11On12CreateDevice returned no device".into(),
            ));
        };

        let on12: ID3D11On12Device = device11
            .cast()
            .map_err(|e| FrameLinkError::DeviceCreation(format!("ID3D11On12Device: {}", e)))?;

        tracing::info!("Created D3D11-on-12 compatibility device");
        Ok((
            D3dDevice {
                device: device11,
                context,
            },
            D3dCompat { on12 },
        ))
    }
}

/// D3D11 device and its immediate context.
pub struct D3dDevice {
    device: ID3D11Device,
    context: ID3D11DeviceContext,
}

// SAFETY: the immediate context is only used from the render thread that
// owns the bridge context holding this device.
unsafe impl Send for D3dDevice {}
unsafe impl Sync for D3dDevice {}

impl D3dDevice {
    pub fn raw(&self) -> &ID3D11Device {
        &self.device
    }
}

impl ImmediateDevice for D3dDevice {
    type Texture = D3dTexture;

    fn create_shared_texture(
        &self,
        width: u32,
        height: u32,
        format: SharedPixelFormat,
    ) -> Result<(D3dTexture, SharedHandle)> {
        let desc = D3D11_TEXTURE2D_DESC {
            Width: width,
            Height: height,
            MipLevels: 1,
            ArraySize: 1,
            Format: DXGI_FORMAT(format.native_code() as i32),
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: (D3D11_BIND_RENDER_TARGET | D3D11_BIND_SHADER_RESOURCE).0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: D3D11_RESOURCE_MISC_SHARED.0 as u32,
        };

        let mut texture = None;
        unsafe { self.device.CreateTexture2D(&desc, None, Some(&mut texture)) }
            .map_err(gpu_error("CreateTexture2D"))?;
        let texture: ID3D11Texture2D = texture
            .ok_or_else(|| FrameLinkError::Gpu("CreateTexture2D returned no texture".into()))?;

        let resource: IDXGIResource = texture.cast().map_err(gpu_error("IDXGIResource"))?;
        let handle = unsafe { resource.GetSharedHandle() }.map_err(gpu_error("GetSharedHandle"))?;

        Ok((
            D3dTexture(texture),
            SharedHandle::from_raw(handle.0 as usize as u64),
        ))
    }

    fn open_shared_texture(&self, handle: SharedHandle) -> Result<D3dTexture> {
        let raw = HANDLE(handle.as_raw() as usize as *mut c_void);
        let texture: ID3D11Texture2D = unsafe { self.device.OpenSharedResource(raw) }
            .map_err(gpu_error("OpenSharedResource"))?;
        Ok(D3dTexture(texture))
    }

    fn copy_resource(&self, dst: &D3dTexture, src: &D3dTexture) -> Result<()> {
        unsafe { self.context.CopyResource(&dst.0, &src.0) };
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        unsafe { self.context.Flush() };
        Ok(())
    }
}

/// `ID3D11On12Device` bound to the host's D3D12 queue.
pub struct D3dCompat {
    on12: ID3D11On12Device,
}

// SAFETY: see `D3dDevice`.
unsafe impl Send for D3dCompat {}
unsafe impl Sync for D3dCompat {}

impl CompatDevice for D3dCompat {
    type Texture = D3dTexture;
    type QueueResource = D3dQueueResource;

    fn wrap_resource(
        &self,
        resource: &D3dQueueResource,
        usage_state: ResourceState,
        release_state: ResourceState,
    ) -> Result<D3dTexture> {
        let flags = D3D11_RESOURCE_FLAGS::default();
        let wrapped: ID3D11Resource = unsafe {
            self.on12.CreateWrappedResource(
                &resource.0,
                &flags,
                d3d12_state(usage_state),
                d3d12_state(release_state),
            )
        }
        .map_err(|e| FrameLinkError::Wrap(format!("CreateWrappedResource: {}", e)))?;

        let texture: ID3D11Texture2D = wrapped
            .cast()
            .map_err(|e| FrameLinkError::Wrap(format!("wrapped resource is not 2D: {}", e)))?;
        Ok(D3dTexture(texture))
    }

    fn release_wrapped(&self, texture: &D3dTexture) {
        match texture.0.cast::<ID3D11Resource>() {
            Ok(resource) => unsafe { self.on12.ReleaseWrappedResources(&[Some(resource)]) },
            Err(e) => tracing::warn!("Cannot release wrapped resource: {}", e),
        }
    }
}
