// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! POSIX named semaphores as kernel-visible frame-sync events.
//!
//! A semaphore capped at one behaves like an auto-reset event: `set` posts
//! only while the count is zero and a successful wait consumes the count.
//! Semaphores are never unlinked; the name outlives its users the way a
//! peer process expects it to.
//!
//! The check and the post in `set` are serialized within this process only.
//! Two processes setting the same event at once can still leave a count of
//! two, which costs the waiter one extra wakeup.

use std::ffi::CString;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::sync::{EventNamespace, EventWaitResult, NamedEvent};
use crate::core::{FrameLinkError, Result};

/// Longest semaphore name accepted by glibc, leading slash included.
const MAX_NAME_LEN: usize = 251;

/// Held across the value check and the post in [`PosixEvent::set`].
static POST_LOCK: Mutex<()> = parking_lot::const_mutex(());

struct PosixEvent {
    sem: *mut libc::sem_t,
    name: String,
}

// SAFETY: POSIX semaphores are safe to operate on from any thread.
unsafe impl Send for PosixEvent {}
unsafe impl Sync for PosixEvent {}

impl NamedEvent for PosixEvent {
    fn set(&self) -> Result<()> {
        let _guard = POST_LOCK.lock();
        let mut value: libc::c_int = 0;
        if unsafe { libc::sem_getvalue(self.sem, &mut value) } == 0 && value > 0 {
            return Ok(());
        }

        if unsafe { libc::sem_post(self.sem) } != 0 {
            return Err(FrameLinkError::Sync(format!(
                "sem_post({}): {}",
                self.name,
                io::Error::last_os_error()
            )));
        }
        Ok(())
    }

    fn wait_timeout(&self, timeout: Duration) -> Result<EventWaitResult> {
        let deadline = realtime_deadline(timeout)?;
        loop {
            if unsafe { libc::sem_timedwait(self.sem, &deadline) } == 0 {
                return Ok(EventWaitResult::Signaled);
            }

            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EINTR) => continue,
                Some(libc::ETIMEDOUT) => return Ok(EventWaitResult::TimedOut),
                _ => {
                    return Err(FrameLinkError::Sync(format!(
                        "sem_timedwait({}): {}",
                        self.name, err
                    )));
                }
            }
        }
    }
}

impl Drop for PosixEvent {
    fn drop(&mut self) {
        if unsafe { libc::sem_close(self.sem) } != 0 {
            tracing::warn!(
                event = %self.name,
                "sem_close failed: {}",
                io::Error::last_os_error()
            );
        }
    }
}

/// `sem_timedwait` takes an absolute CLOCK_REALTIME deadline.
fn realtime_deadline(timeout: Duration) -> Result<libc::timespec> {
    let mut now = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    if unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut now) } != 0 {
        return Err(FrameLinkError::Io(io::Error::last_os_error()));
    }

    let total_nsec = now.tv_nsec as u64 + timeout.subsec_nanos() as u64;
    let carry = (total_nsec / 1_000_000_000) as libc::time_t;
    Ok(libc::timespec {
        tv_sec: now.tv_sec + timeout.as_secs() as libc::time_t + carry,
        tv_nsec: (total_nsec % 1_000_000_000) as libc::c_long,
    })
}

/// Semaphore name for an event name: one leading slash, no others.
fn semaphore_name(name: &str) -> String {
    let mut sem_name = String::with_capacity(name.len() + 1);
    sem_name.push('/');
    for c in name.chars() {
        if sem_name.len() + c.len_utf8() > MAX_NAME_LEN {
            break;
        }
        sem_name.push(if c == '/' { '_' } else { c });
    }
    sem_name
}

/// The host's POSIX named-semaphore namespace.
#[derive(Default)]
pub struct PosixEventNamespace;

impl PosixEventNamespace {
    pub fn new() -> Self {
        Self
    }

    fn open_with(&self, name: &str, create: bool) -> Result<Arc<dyn NamedEvent>> {
        let sem_name = semaphore_name(name);
        let c_name = CString::new(sem_name.clone())
            .map_err(|_| FrameLinkError::Sync(format!("event name {:?} contains NUL", name)))?;

        let sem = unsafe {
            if create {
                libc::sem_open(
                    c_name.as_ptr(),
                    libc::O_CREAT,
                    0o644 as libc::c_uint,
                    0 as libc::c_uint,
                )
            } else {
                libc::sem_open(c_name.as_ptr(), 0)
            }
        };

        if sem == libc::SEM_FAILED {
            let err = io::Error::last_os_error();
            return Err(if create {
                FrameLinkError::Sync(format!("sem_open({}): {}", sem_name, err))
            } else {
                FrameLinkError::NotFound(format!("sem_open({}): {}", sem_name, err))
            });
        }

        Ok(Arc::new(PosixEvent {
            sem,
            name: sem_name,
        }))
    }
}

impl EventNamespace for PosixEventNamespace {
    fn open(&self, name: &str) -> Result<Arc<dyn NamedEvent>> {
        self.open_with(name, false)
    }

    fn create(&self, name: &str) -> Result<Arc<dyn NamedEvent>> {
        self.open_with(name, true)
    }

    fn description(&self) -> &str {
        "POSIX named semaphores"
    }
}
