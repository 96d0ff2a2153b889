// src/engine/pacer.rs

//! Frame-pacing engine.
//!
//! Behaves like an engine that owns its own vsync thread: every frame
//! interval it posts a frame task to the platform runner, and each frame task
//! renders a blank software frame on the designated thread and presents it
//! through `acknowledge_frame`. It does no layout or painting.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::anyhow;
use tracing::{debug, error, info};

use super::adapter::HostAdapter;
use super::{Engine, EngineArgs, EngineLauncher};
use crate::clock::NANOS_PER_SEC;
use crate::errors::{HostError, Result};

/// Largest accepted surface width or height, in pixels.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Frame geometry and rate for the pacing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacerOptions {
    pub frame_rate: u32,
    pub surface_width: u32,
    pub surface_height: u32,
}

impl Default for PacerOptions {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            surface_width: 800,
            surface_height: 600,
        }
    }
}

impl PacerOptions {
    fn frame_interval_nanos(&self) -> u64 {
        NANOS_PER_SEC / u64::from(self.frame_rate.max(1))
    }

    /// Byte layout of one RGBA frame, or `None` when the surface is empty,
    /// larger than [`MAX_SURFACE_DIMENSION`] or does not fit in memory.
    fn geometry(&self) -> Option<FrameGeometry> {
        let in_range = |d: u32| (1..=MAX_SURFACE_DIMENSION).contains(&d);
        if !in_range(self.surface_width) || !in_range(self.surface_height) {
            return None;
        }
        let row_stride = usize::try_from(self.surface_width).ok()?.checked_mul(4)?;
        let height = usize::try_from(self.surface_height).ok()?;
        let len = row_stride.checked_mul(height)?;
        Some(FrameGeometry {
            row_stride,
            height,
            len,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct FrameGeometry {
    row_stride: usize,
    height: usize,
    len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FramePacerLauncher {
    options: PacerOptions,
}

impl FramePacerLauncher {
    pub fn new(options: PacerOptions) -> Self {
        Self { options }
    }
}

impl EngineLauncher for FramePacerLauncher {
    fn launch(&self, args: EngineArgs) -> Result<Box<dyn Engine>> {
        let runner = args.platform_runner.runner;
        let options = self.options;

        let geometry = options
            .geometry()
            .filter(|_| options.frame_rate > 0)
            .ok_or_else(|| {
                HostError::EngineStart(format!(
                    "invalid surface: {}x{} at {} fps",
                    options.surface_width, options.surface_height, options.frame_rate
                ))
            })?;

        debug!(
            runner_id = args.platform_runner.identifier,
            assets = %args.assets_path.display(),
            icu = %args.icu_data_path.display(),
            payload = %args.payload.path.display(),
            "launching frame pacer engine"
        );

        // First frame: inline when we are already on the platform thread.
        if runner.runs_on_designated_thread() {
            render_frame(&runner, geometry);
        } else {
            let frame_runner = runner.clone();
            runner.post_task(runner.now_nanos(), move || render_frame(&frame_runner, geometry))?;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let vsync = {
            let runner = runner.clone();
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("engine.vsync".to_string())
                .spawn(move || vsync_loop(runner, stop, options, geometry))
                .map_err(|e| HostError::EngineStart(format!("spawning vsync thread: {e}")))?
        };

        runner.log_message(
            Some("pacer"),
            &format!(
                "engine started: {}x{} @ {} fps, payload {}",
                options.surface_width,
                options.surface_height,
                options.frame_rate,
                args.payload.fingerprint
            ),
        );

        Ok(Box::new(FramePacerEngine {
            runner,
            stop,
            vsync: Some(vsync),
        }))
    }
}

/// Running pacing engine. Stopping it joins the vsync thread.
#[derive(Debug)]
pub struct FramePacerEngine {
    runner: HostAdapter,
    stop: Arc<AtomicBool>,
    vsync: Option<JoinHandle<()>>,
}

impl Engine for FramePacerEngine {
    fn shutdown(&mut self) -> Result<()> {
        let Some(vsync) = self.vsync.take() else {
            return Ok(());
        };

        self.stop.store(true, Ordering::SeqCst);
        vsync.thread().unpark();
        vsync
            .join()
            .map_err(|_| HostError::Other(anyhow!("vsync thread panicked")))?;

        self.runner.log_message(
            Some("pacer"),
            &format!(
                "engine stopped after {} frames",
                self.runner.frames_presented()
            ),
        );
        Ok(())
    }
}

impl Drop for FramePacerEngine {
    fn drop(&mut self) {
        if self.vsync.is_some() {
            if let Err(err) = self.shutdown() {
                error!(error = %err, "frame pacer shutdown failed during drop");
            }
        }
    }
}

fn vsync_loop(
    runner: HostAdapter,
    stop: Arc<AtomicBool>,
    options: PacerOptions,
    geometry: FrameGeometry,
) {
    let interval = options.frame_interval_nanos();
    let mut next_vsync = runner.now_nanos().saturating_add(interval);

    while !stop.load(Ordering::SeqCst) {
        let frame_runner = runner.clone();
        if runner
            .post_task(next_vsync, move || render_frame(&frame_runner, geometry))
            .is_err()
        {
            debug!(next_vsync, "frame task dropped");
        }

        // Park until the vsync we just scheduled; shutdown unparks us.
        loop {
            let now = runner.now_nanos();
            if now >= next_vsync || stop.load(Ordering::SeqCst) {
                break;
            }
            thread::park_timeout(Duration::from_nanos(next_vsync - now));
        }

        next_vsync = next_vsync.saturating_add(interval);
        let now = runner.now_nanos();
        if next_vsync < now {
            // Fell more than a frame behind; skip ahead instead of bursting.
            next_vsync = now.saturating_add(interval);
        }
    }

    info!("vsync thread stopped");
}

fn render_frame(runner: &HostAdapter, geometry: FrameGeometry) {
    let pixels = vec![0u8; geometry.len];
    runner.acknowledge_frame(&pixels, geometry.row_stride, geometry.height);
}
