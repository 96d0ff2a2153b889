// src/sched/task.rs

use std::fmt;

/// Opaque unit of work handed over by the engine.
///
/// Invoked exactly once, on the designated thread. Whatever happens inside
/// is the engine's business.
pub type TaskCallback = Box<dyn FnOnce() + Send + 'static>;

/// A callback plus the earliest monotonic time it may run at.
pub struct ScheduledTask {
    callback: TaskCallback,
    target_time_nanos: u64,
}

impl ScheduledTask {
    pub fn new<F>(target_time_nanos: u64, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
            target_time_nanos,
        }
    }

    pub fn target_time_nanos(&self) -> u64 {
        self.target_time_nanos
    }

    /// Consume the task and run its callback.
    pub fn run(self) {
        (self.callback)()
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("target_time_nanos", &self.target_time_nanos)
            .finish_non_exhaustive()
    }
}
