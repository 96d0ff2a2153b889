// src/sched/run_loop.rs

//! The designated-thread run loop.
//!
//! States:
//! - `Idle`: queue empty, wait the idle quantum (or until a post arrives).
//! - `Waiting`: earliest task not yet due, wait exactly until it is.
//! - `Executing`: the earliest task is due, pop it and run it outside the
//!   queue lock.
//!
//! Every wait is a timed wait on the context's condition variable, so a
//! shutdown request ends it immediately and a newly posted earlier task is
//! picked up before the one that was being waited for.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace};

use super::context::HostContext;
use crate::errors::{HostError, Result};

/// Default idle quantum.
pub const DEFAULT_IDLE_QUANTUM: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Waiting { until_nanos: u64 },
    Executing,
}

/// What a single iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStep {
    /// Queue was empty; waited up to the idle quantum.
    Idle,
    /// Earliest task was not due; waited up to its target time.
    Waited { until_nanos: u64 },
    /// Ran one task.
    Executed {
        target_time_nanos: u64,
        lateness_nanos: u64,
    },
    /// `running` was false; nothing was done.
    Shutdown,
}

/// Counters returned when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: u64,
    pub idle_waits: u64,
    pub timed_waits: u64,
}

#[derive(Debug)]
pub struct Scheduler {
    context: Arc<HostContext>,
    idle_quantum: Duration,
    state: LoopState,
}

impl Scheduler {
    pub fn new(context: Arc<HostContext>) -> Self {
        Self::with_idle_quantum(context, DEFAULT_IDLE_QUANTUM)
    }

    pub fn with_idle_quantum(context: Arc<HostContext>, idle_quantum: Duration) -> Self {
        Self {
            context,
            idle_quantum,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn context(&self) -> &Arc<HostContext> {
        &self.context
    }

    /// Run until shutdown is requested.
    ///
    /// Must be called on the designated thread. The step in progress when
    /// shutdown arrives is finished, not abandoned; tasks still queued stay
    /// queued for the owner to discard.
    pub fn run(&mut self) -> Result<RunSummary> {
        if !self.context.runs_on_designated_thread() {
            return Err(HostError::NotDesignatedThread);
        }

        info!(
            idle_quantum_ms = self.idle_quantum.as_millis() as u64,
            "run loop started"
        );

        let mut summary = RunSummary::default();
        loop {
            match self.step() {
                LoopStep::Idle => summary.idle_waits += 1,
                LoopStep::Waited { .. } => summary.timed_waits += 1,
                LoopStep::Executed { .. } => summary.executed += 1,
                LoopStep::Shutdown => break,
            }
        }

        info!(
            executed = summary.executed,
            pending = self.context.pending(),
            "run loop exiting"
        );
        Ok(summary)
    }

    /// Perform one iteration of the loop.
    pub fn step(&mut self) -> LoopStep {
        let mut queue = self.context.lock_queue();

        // Checked under the lock; see `HostContext::request_shutdown`.
        if !self.context.is_running() {
            return LoopStep::Shutdown;
        }

        let Some(deadline) = queue.next_deadline() else {
            self.state = LoopState::Idle;
            let _queue = self.context.wait(queue, self.idle_quantum);
            return LoopStep::Idle;
        };

        let now = self.context.now_nanos();
        if deadline > now {
            self.state = LoopState::Waiting {
                until_nanos: deadline,
            };
            let delta = Duration::from_nanos(deadline - now);
            trace!(deadline, delta_us = delta.as_micros() as u64, "waiting for next task");
            let _queue = self.context.wait(queue, delta);
            return LoopStep::Waited {
                until_nanos: deadline,
            };
        }

        let Some(task) = queue.pop_earliest() else {
            // Unreachable while we hold the lock, but never spin on it.
            return LoopStep::Idle;
        };
        let depth = queue.len();
        drop(queue);

        self.state = LoopState::Executing;
        let target_time_nanos = task.target_time_nanos();
        let lateness_nanos = now - target_time_nanos;
        trace!(target_time_nanos, lateness_nanos, depth, "running task");
        task.run();
        self.state = LoopState::Idle;

        if lateness_nanos > 100 * crate::clock::NANOS_PER_MILLI {
            debug!(
                target_time_nanos,
                lateness_ms = lateness_nanos / crate::clock::NANOS_PER_MILLI,
                "task ran late"
            );
        }

        LoopStep::Executed {
            target_time_nanos,
            lateness_nanos,
        }
    }
}
