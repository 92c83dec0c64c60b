// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Dedicated thread for native GPU work.
//!
//! Every wrap, copy, flush and context teardown for a channel runs here, so
//! one thread at a time touches a given device. Callers on other threads
//! hand work over and, for [`RenderThread::run_blocking`], wait for it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{Receiver, Sender};

use crate::core::{FrameLinkError, Result};

type RenderCommand = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(RenderCommand),
    Shutdown,
}

pub struct RenderThread {
    name: String,
    command_tx: Sender<Message>,
    thread_id: ThreadId,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    pub fn spawn(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let (command_tx, command_rx) = crossbeam_channel::unbounded();

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_loop(command_rx))
            .map_err(|e| FrameLinkError::Runtime(format!("Failed to spawn render thread: {}", e)))?;

        let thread_id = handle.thread().id();
        tracing::debug!(thread = %name, "Render thread started");

        Ok(Self {
            name,
            command_tx,
            thread_id,
            handle: Some(handle),
        })
    }

    /// Whether the caller is already on this render thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Run `f` on the render thread and wait for its result. Runs inline
    /// when called from the render thread itself.
    pub fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        if self.is_current() {
            return Ok(f());
        }

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.command_tx
            .send(Message::Run(Box::new(move || {
                let _ = reply_tx.send(f());
            })))
            .map_err(|_| FrameLinkError::Runtime("Render thread command channel closed".into()))?;

        reply_rx.recv().map_err(|_| {
            FrameLinkError::Runtime(format!("Render command on '{}' did not complete", self.name))
        })
    }

    /// Queue `f` without waiting.
    pub fn run_async<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.command_tx
            .send(Message::Run(Box::new(f)))
            .map_err(|_| FrameLinkError::Runtime("Render thread command channel closed".into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn run_loop(command_rx: Receiver<Message>) {
    while let Ok(message) = command_rx.recv() {
        match message {
            Message::Run(command) => {
                if catch_unwind(AssertUnwindSafe(command)).is_err() {
                    tracing::error!("Render command panicked");
                }
            }
            Message::Shutdown => break,
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        // Commands queued before this point still run.
        let _ = self.command_tx.send(Message::Shutdown);
        if let Some(handle) = self.handle.take() {
            if self.is_current() {
                return;
            }
            if handle.join().is_err() {
                tracing::warn!(thread = %self.name, "Render thread exited with a panic");
            }
        }
        tracing::debug!(thread = %self.name, "Render thread stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_run_blocking_returns_value_from_render_thread() {
        let render = RenderThread::spawn("test-render").unwrap();
        let caller = thread::current().id();

        let (value, ran_on) = render
            .run_blocking(|| (42, thread::current().id()))
            .unwrap();

        assert_eq!(value, 42);
        assert_ne!(ran_on, caller);
        assert!(!render.is_current());
    }

    #[test]
    fn test_run_async_executes_in_order() {
        let render = RenderThread::spawn("test-render").unwrap();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        for i in 0..5 {
            let order = order.clone();
            render.run_async(move || order.lock().push(i)).unwrap();
        }
        render.run_blocking(|| ()).unwrap();

        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_panicking_command_does_not_kill_thread() {
        let render = RenderThread::spawn("test-render").unwrap();

        let result = render.run_blocking(|| -> u32 { panic!("boom") });
        assert!(result.is_err());
        assert_eq!(render.run_blocking(|| 7).unwrap(), 7);
    }

    #[test]
    fn test_drop_drains_queued_commands() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let render = RenderThread::spawn("test-render").unwrap();
            for _ in 0..10 {
                let counter = counter.clone();
                render
                    .run_async(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
