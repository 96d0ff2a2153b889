// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::engine::DEFAULT_RUNNER_ID;
use crate::engine::pacer::PacerOptions;
use crate::sched::TaskQueue;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [scheduler]
/// idle_quantum_ms = 5
/// runner_id = 1
/// # max_pending_tasks = 4096
///
/// [bundle]
/// assets_dir = "flutter_assets"
/// icu_data = "icudtl.dat"
/// payload = "libapp.so"
///
/// [engine]
/// frame_rate = 60
/// surface_width = 800
/// surface_height = 600
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub scheduler: SchedulerSection,

    #[serde(default)]
    pub bundle: BundleSection,

    #[serde(default)]
    pub engine: EngineSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`
/// or `Default`.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub scheduler: SchedulerSection,
    pub bundle: BundleSection,
    pub engine: EngineSection,
}

impl HostConfig {
    pub(crate) fn new_unchecked(
        scheduler: SchedulerSection,
        bundle: BundleSection,
        engine: EngineSection,
    ) -> Self {
        Self {
            scheduler,
            bundle,
            engine,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new_unchecked(
            SchedulerSection::default(),
            BundleSection::default(),
            EngineSection::default(),
        )
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSection {
    /// How long the run loop waits when the queue is empty before checking
    /// again. A post or shutdown ends the wait early.
    #[serde(default = "default_idle_quantum_ms")]
    pub idle_quantum_ms: u64,

    /// Identifier reported to the engine for the platform task runner.
    #[serde(default = "default_runner_id")]
    pub runner_id: u64,

    /// Cap on pending tasks. Posts beyond it are dropped with a warning.
    #[serde(default)]
    pub max_pending_tasks: Option<usize>,
}

fn default_idle_quantum_ms() -> u64 {
    5
}

fn default_runner_id() -> u64 {
    DEFAULT_RUNNER_ID
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            idle_quantum_ms: default_idle_quantum_ms(),
            runner_id: default_runner_id(),
            max_pending_tasks: None,
        }
    }
}

impl SchedulerSection {
    pub fn idle_quantum(&self) -> Duration {
        Duration::from_millis(self.idle_quantum_ms)
    }

    pub fn task_queue(&self) -> TaskQueue {
        match self.max_pending_tasks {
            Some(max) => TaskQueue::with_max_depth(max),
            None => TaskQueue::new(),
        }
    }
}

/// `[bundle]` section: names inside the bundle root.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleSection {
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,

    #[serde(default = "default_icu_data")]
    pub icu_data: String,

    /// Explicit payload path. Relative paths are resolved against the bundle
    /// root. When unset, the platform's usual file names are tried.
    #[serde(default)]
    pub payload: Option<PathBuf>,
}

fn default_assets_dir() -> String {
    "flutter_assets".to_string()
}

fn default_icu_data() -> String {
    "icudtl.dat".to_string()
}

impl Default for BundleSection {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            icu_data: default_icu_data(),
            payload: None,
        }
    }
}

/// `[engine]` section, consumed by the frame-pacing engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    #[serde(default = "default_surface_width")]
    pub surface_width: u32,

    #[serde(default = "default_surface_height")]
    pub surface_height: u32,
}

fn default_frame_rate() -> u32 {
    60
}

fn default_surface_width() -> u32 {
    800
}

fn default_surface_height() -> u32 {
    600
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            surface_width: default_surface_width(),
            surface_height: default_surface_height(),
        }
    }
}

impl EngineSection {
    pub fn pacer_options(&self) -> PacerOptions {
        PacerOptions {
            frame_rate: self.frame_rate,
            surface_width: self.surface_width,
            surface_height: self.surface_height,
        }
    }
}
