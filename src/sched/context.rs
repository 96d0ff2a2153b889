// src/sched/context.rs

//! Shared state between the run loop, the engine adapter and the shutdown
//! path.
//!
//! One `HostContext` exists per host. It owns:
//! - the clock
//! - the task queue, behind a mutex
//! - the condition variable both run-loop waits block on
//! - the `running` flag
//! - the identity of the designated thread (the thread that created it)
//!
//! The mutex is held only to push or pop. Callbacks never run under it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;

use tracing::{debug, info};

use super::queue::TaskQueue;
use super::task::ScheduledTask;
use crate::clock::Clock;
use crate::errors::Result;

#[derive(Debug)]
pub struct HostContext {
    clock: Arc<dyn Clock>,
    queue: Mutex<TaskQueue>,
    wake: Condvar,
    running: AtomicBool,
    designated: ThreadId,
}

impl HostContext {
    /// Create a context bound to the calling thread.
    ///
    /// The calling thread becomes the designated thread: the run loop must be
    /// started on it and every queued callback is invoked on it.
    pub fn new(clock: Arc<dyn Clock>) -> Arc<Self> {
        Self::with_queue(clock, TaskQueue::new())
    }

    /// Like [`HostContext::new`], starting from a preconfigured queue.
    pub fn with_queue(clock: Arc<dyn Clock>, queue: TaskQueue) -> Arc<Self> {
        let designated = thread::current().id();
        debug!(?designated, max_depth = ?queue.max_depth(), "host context bound to designated thread");
        Arc::new(Self {
            clock,
            queue: Mutex::new(queue),
            wake: Condvar::new(),
            running: AtomicBool::new(true),
            designated,
        })
    }

    pub fn now_nanos(&self) -> u64 {
        self.clock.now_nanos()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn runs_on_designated_thread(&self) -> bool {
        thread::current().id() == self.designated
    }

    /// Enqueue a task and wake the run loop so it can re-evaluate its wait.
    pub fn post(&self, task: ScheduledTask) -> Result<()> {
        let mut queue = self.lock_queue();
        queue.push(task)?;
        self.wake.notify_all();
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Flip `running` to false and wake any blocked wait.
    ///
    /// Returns true only for the call that actually stopped the host.
    pub fn request_shutdown(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::SeqCst);
        // Notify under the lock so a loop that has just checked the flag
        // cannot miss the wake-up.
        let _queue = self.lock_queue();
        self.wake.notify_all();
        if was_running {
            info!("shutdown requested");
        }
        was_running
    }

    pub fn shutdown_handle(self: &Arc<Self>) -> ShutdownHandle {
        ShutdownHandle {
            context: Arc::clone(self),
        }
    }

    pub fn pending(&self) -> usize {
        self.lock_queue().len()
    }

    /// Drop every pending task without running it.
    pub fn discard_pending(&self) -> usize {
        self.lock_queue().clear()
    }

    pub(crate) fn lock_queue(&self) -> MutexGuard<'_, TaskQueue> {
        // A panic while holding the lock can only come from push/pop, which
        // leave the heap consistent, so keep going with the inner value.
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block on the wake condition for at most `timeout`, releasing the queue
    /// lock while waiting. Returns early on a post or a shutdown request (or
    /// spuriously); callers re-evaluate afterwards.
    pub(crate) fn wait<'a>(
        &self,
        guard: MutexGuard<'a, TaskQueue>,
        timeout: Duration,
    ) -> MutexGuard<'a, TaskQueue> {
        match self.wake.wait_timeout(guard, timeout) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }
}

/// Cloneable handle that stops the run loop. Given to signal handlers.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    context: Arc<HostContext>,
}

impl ShutdownHandle {
    pub fn request(&self) -> bool {
        self.context.request_shutdown()
    }

    pub fn is_requested(&self) -> bool {
        !self.context.is_running()
    }
}
