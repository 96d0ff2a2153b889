// src/sched/mod.rs

//! Monotonic task scheduler standing in for the platform event loop.
//!
//! - [`task`]: the opaque callback plus its target time.
//! - [`queue`]: time-ordered, FIFO-stable pending task collection.
//! - [`context`]: the shared host context (queue lock, wake condition,
//!   running flag, designated thread).
//! - [`run_loop`]: the Idle / Waiting / Executing driver.

pub mod context;
pub mod queue;
pub mod run_loop;
pub mod task;

pub use context::{HostContext, ShutdownHandle};
pub use queue::TaskQueue;
pub use run_loop::{DEFAULT_IDLE_QUANTUM, LoopState, LoopStep, RunSummary, Scheduler};
pub use task::{ScheduledTask, TaskCallback};
