// src/host.rs

//! Host lifecycle: prepare the bundle, launch the engine, run the loop,
//! tear everything down.
//!
//! Teardown is ownership-driven. Whatever was acquired before a failure is
//! released when its owner goes out of scope, and the engine is always shut
//! down before the pending task queue is discarded.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::bundle::{AotPayload, BundleLayout, PayloadLoader};
use crate::clock::{Clock, MonotonicClock};
use crate::config::HostConfig;
use crate::engine::{Engine, EngineArgs, EngineLauncher, HostAdapter, TaskRunnerDescriptor};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::sched::{HostContext, RunSummary, Scheduler, ShutdownHandle};
use crate::shutdown::ShutdownSource;

/// A bundle whose layout was checked and whose payload was loaded.
#[derive(Debug, Clone)]
pub struct PreparedBundle {
    pub layout: BundleLayout,
    pub payload: AotPayload,
}

impl PreparedBundle {
    /// Resolve the layout under `root` and load its payload.
    pub fn prepare(
        fs: &dyn FileSystem,
        loader: &dyn PayloadLoader,
        root: &Path,
        config: &HostConfig,
    ) -> Result<Self> {
        let layout = BundleLayout::resolve(fs, root, &config.bundle)?;
        let payload = loader.load(fs, &layout.payload_path)?;
        Ok(Self { layout, payload })
    }
}

/// The host process minus argument parsing.
///
/// Created on the designated thread; [`Host::run`] must be called on the same
/// thread.
#[derive(Debug)]
pub struct Host {
    config: HostConfig,
    context: Arc<HostContext>,
    adapter: HostAdapter,
}

impl Host {
    pub fn new(config: HostConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(config: HostConfig, clock: Arc<dyn Clock>) -> Self {
        let context = HostContext::with_queue(clock, config.scheduler.task_queue());
        let adapter = HostAdapter::new(Arc::clone(&context));
        Self {
            config,
            context,
            adapter,
        }
    }

    pub fn context(&self) -> &Arc<HostContext> {
        &self.context
    }

    pub fn adapter(&self) -> &HostAdapter {
        &self.adapter
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.context.shutdown_handle()
    }

    /// Launch the engine and drive it until shutdown.
    ///
    /// Returns once a shutdown request has been observed, the engine has been
    /// stopped and the remaining queued tasks have been discarded.
    pub fn run(
        self,
        bundle: PreparedBundle,
        launcher: &dyn EngineLauncher,
        signals: &mut dyn ShutdownSource,
    ) -> Result<RunSummary> {
        signals.install(self.context.shutdown_handle())?;

        let args = EngineArgs {
            assets_path: bundle.layout.assets_path.clone(),
            icu_data_path: bundle.layout.icu_data_path.clone(),
            payload: bundle.payload,
            platform_runner: TaskRunnerDescriptor::new(
                self.config.scheduler.runner_id,
                self.adapter.clone(),
            ),
        };

        let mut engine = EngineGuard::new(launcher.launch(args)?);
        info!(bundle = %bundle.layout.root.display(), "engine started");

        let mut scheduler =
            Scheduler::with_idle_quantum(Arc::clone(&self.context), self.config.scheduler.idle_quantum());
        let summary = scheduler.run();

        info!("shutting down engine");
        let stopped = engine.shutdown();

        let discarded = self.context.discard_pending();
        info!(
            discarded,
            frames = self.adapter.frames_presented(),
            "host stopped"
        );

        stopped?;
        summary
    }
}

/// Makes sure the engine is stopped even if the run loop unwinds.
struct EngineGuard {
    engine: Option<Box<dyn Engine>>,
}

impl EngineGuard {
    fn new(engine: Box<dyn Engine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        match self.engine.take() {
            Some(mut engine) => engine.shutdown(),
            None => Ok(()),
        }
    }
}

impl Drop for EngineGuard {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            error!(error = %err, "engine shutdown failed during unwind");
        }
    }
}
