// src/engine/adapter.rs

//! The host side of the engine boundary.
//!
//! The engine only ever sees a [`TaskRunnerDescriptor`]: a stable identifier
//! plus a [`HostAdapter`] exposing the host capabilities it needs.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, trace};

use crate::errors::Result;
use crate::sched::{HostContext, ScheduledTask};

/// Identifier of the single platform task runner unless configured otherwise.
pub const DEFAULT_RUNNER_ID: u64 = 1;

/// Capabilities handed to the engine. Cheap to clone; safe to use from any
/// engine thread.
#[derive(Clone)]
pub struct HostAdapter {
    context: Arc<HostContext>,
    frames_presented: Arc<AtomicU64>,
}

impl HostAdapter {
    pub fn new(context: Arc<HostContext>) -> Self {
        Self {
            context,
            frames_presented: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Whether the caller is on the thread the run loop executes on.
    ///
    /// The engine uses this to decide between running work inline and
    /// posting it.
    pub fn runs_on_designated_thread(&self) -> bool {
        self.context.runs_on_designated_thread()
    }

    /// Queue `callback` to run on the designated thread no earlier than
    /// `target_time_nanos`. Callable from any thread.
    ///
    /// Fails only if the queue could not grow; the task is then dropped and
    /// the failure has already been logged.
    pub fn post_task<F>(&self, target_time_nanos: u64, callback: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.context
            .post(ScheduledTask::new(target_time_nanos, callback))
    }

    /// Present a rendered frame. There is no display, so the pixels are
    /// ignored and the frame always counts as presented.
    ///
    /// The buffer is only borrowed for the duration of the call.
    pub fn acknowledge_frame(&self, pixels: &[u8], row_stride: usize, height: usize) -> bool {
        let frame = self.frames_presented.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(
            frame,
            bytes = pixels.len(),
            row_stride,
            height,
            "frame acknowledged"
        );
        true
    }

    /// Host monotonic time, on the same epoch as task target times.
    pub fn now_nanos(&self) -> u64 {
        self.context.now_nanos()
    }

    /// Log sink for engine messages.
    pub fn log_message(&self, tag: Option<&str>, message: &str) {
        info!(target: "engine", tag = tag.unwrap_or("flutter"), "{message}");
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for HostAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostAdapter")
            .field("frames_presented", &self.frames_presented())
            .finish_non_exhaustive()
    }
}

/// The platform task runner as described to the engine.
#[derive(Debug, Clone)]
pub struct TaskRunnerDescriptor {
    pub identifier: u64,
    pub runner: HostAdapter,
}

impl TaskRunnerDescriptor {
    pub fn new(identifier: u64, runner: HostAdapter) -> Self {
        Self { identifier, runner }
    }
}
