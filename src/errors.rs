// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every fatal startup condition has its own variant so `main` can report it
//! once and exit non-zero. `QueueGrowth` is the only variant the run loop
//! recovers from.

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Missing flutter assets at {}", .0.display())]
    MissingAssets(PathBuf),

    #[error("Missing ICU data at {}", .0.display())]
    MissingIcuData(PathBuf),

    #[error("Missing AOT library at {}\nBuild with: {hint}", path.display())]
    MissingPayload { path: PathBuf, hint: String },

    #[error("Failed to load AOT payload from {}: {reason}", path.display())]
    PayloadLoad { path: PathBuf, reason: String },

    #[error("Failed to find AOT symbols in {}: missing {}", path.display(), missing.join(", "))]
    MissingSymbols { path: PathBuf, missing: Vec<String> },

    #[error("Engine start failed: {0}")]
    EngineStart(String),

    #[error("Task queue could not grow past {depth} pending tasks")]
    QueueGrowth {
        depth: usize,
        #[source]
        source: Option<TryReserveError>,
    },

    #[error("Run loop must be started on the thread that created the host context")]
    NotDesignatedThread,

    #[error("Signal handling error: {0}")]
    Signal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HostError {
    /// True for the conditions that abort startup (everything except a
    /// dropped task).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HostError::QueueGrowth { .. })
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HostError>;
