// src/engine/mod.rs

//! Boundary with the embedded UI engine.
//!
//! The host never calls into engine internals directly. It launches an
//! engine through an [`EngineLauncher`], hands it a
//! [`TaskRunnerDescriptor`](adapter::TaskRunnerDescriptor), and shuts it
//! down before tearing down the task queue.
//!
//! - [`adapter`] is the host-side capability set the engine talks to.
//! - [`pacer`] is the built-in frame-pacing engine used when no other
//!   engine binding is wired in.

use std::path::PathBuf;

use crate::bundle::AotPayload;
use crate::errors::Result;

pub mod adapter;
pub mod pacer;

pub use adapter::{DEFAULT_RUNNER_ID, HostAdapter, TaskRunnerDescriptor};
pub use pacer::{FramePacerEngine, FramePacerLauncher, MAX_SURFACE_DIMENSION, PacerOptions};

/// Startup data passed to the engine.
#[derive(Debug, Clone)]
pub struct EngineArgs {
    pub assets_path: PathBuf,
    pub icu_data_path: PathBuf,
    pub payload: AotPayload,
    pub platform_runner: TaskRunnerDescriptor,
}

/// A running engine instance.
pub trait Engine: Send {
    /// Stop the engine. Called exactly once, on the designated thread, after
    /// the run loop has exited and before pending tasks are discarded.
    fn shutdown(&mut self) -> Result<()>;
}

/// Trait abstracting how an engine is started.
///
/// Production code uses [`FramePacerLauncher`]; tests provide launchers that
/// fail or record what they were given.
pub trait EngineLauncher {
    /// Start the engine on the designated thread.
    ///
    /// The engine may post tasks from inside this call; they run once the
    /// host enters its run loop. Failures map to `HostError::EngineStart`.
    fn launch(&self, args: EngineArgs) -> Result<Box<dyn Engine>>;
}
