// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Named auto-reset Win32 events.

use std::ffi::CString;
use std::sync::Arc;
use std::time::Duration;

use ::windows::core::PCSTR;
use ::windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_FAILED, WAIT_OBJECT_0, WAIT_TIMEOUT};
use ::windows::Win32::System::Threading::{
    CreateEventA, OpenEventA, SetEvent, WaitForSingleObject, EVENT_MODIFY_STATE,
    SYNCHRONIZATION_SYNCHRONIZE,
};

use crate::core::sync::{EventNamespace, EventWaitResult, NamedEvent};
use crate::core::{FrameLinkError, Result};

struct Win32Event {
    handle: HANDLE,
    name: String,
}

// SAFETY: event handles may be used from any thread.
unsafe impl Send for Win32Event {}
unsafe impl Sync for Win32Event {}

impl NamedEvent for Win32Event {
    fn set(&self) -> Result<()> {
        unsafe { SetEvent(self.handle) }
            .map_err(|e| FrameLinkError::Sync(format!("SetEvent({}): {}", self.name, e)))
    }

    fn wait_timeout(&self, timeout: Duration) -> Result<EventWaitResult> {
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX - 1);
        let result = unsafe { WaitForSingleObject(self.handle, millis) };
        if result == WAIT_OBJECT_0 {
            Ok(EventWaitResult::Signaled)
        } else if result == WAIT_TIMEOUT {
            Ok(EventWaitResult::TimedOut)
        } else if result == WAIT_FAILED {
            Err(FrameLinkError::Sync(format!(
                "WaitForSingleObject({}): {}",
                self.name,
                std::io::Error::last_os_error()
            )))
        } else {
            Err(FrameLinkError::Sync(format!(
                "WaitForSingleObject({}) returned {:?}",
                self.name, result
            )))
        }
    }
}

impl Drop for Win32Event {
    fn drop(&mut self) {
        if let Err(e) = unsafe { CloseHandle(self.handle) } {
            tracing::warn!(event = %self.name, "CloseHandle failed: {}", e);
        }
    }
}

/// The session's named kernel object namespace.
#[derive(Default)]
pub struct Win32EventNamespace;

impl Win32EventNamespace {
    pub fn new() -> Self {
        Self
    }

    fn c_name(name: &str) -> Result<CString> {
        CString::new(name)
            .map_err(|_| FrameLinkError::Sync(format!("event name {:?} contains NUL", name)))
    }
}

impl EventNamespace for Win32EventNamespace {
    fn open(&self, name: &str) -> Result<Arc<dyn NamedEvent>> {
        let c_name = Self::c_name(name)?;
        let handle = unsafe {
            OpenEventA(
                EVENT_MODIFY_STATE | SYNCHRONIZATION_SYNCHRONIZE,
                false,
                PCSTR(c_name.as_ptr() as *const u8),
            )
        }
        .map_err(|e| FrameLinkError::NotFound(format!("OpenEventA({}): {}", name, e)))?;

        Ok(Arc::new(Win32Event {
            handle,
            name: name.to_string(),
        }))
    }

    fn create(&self, name: &str) -> Result<Arc<dyn NamedEvent>> {
        let c_name = Self::c_name(name)?;
        // Auto-reset, initially unsignalled. Returns the existing object if
        // the name is already taken by another event.
        let handle = unsafe {
            CreateEventA(None, false, false, PCSTR(c_name.as_ptr() as *const u8))
        }
        .map_err(|e| FrameLinkError::Sync(format!("CreateEventA({}): {}", name, e)))?;

        Ok(Arc::new(Win32Event {
            handle,
            name: name.to_string(),
        }))
    }

    fn description(&self) -> &str {
        "Win32 named events"
    }
}
