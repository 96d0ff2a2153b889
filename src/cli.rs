// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `headless-host`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "headless-host",
    version,
    about = "Run a prebuilt Flutter bundle headlessly and keep it alive until interrupted.",
    long_about = None
)]
pub struct CliArgs {
    /// Bundle root containing `flutter_assets/`, `icudtl.dat` and the AOT
    /// library.
    ///
    /// `HEADLESS_HOST_BUNDLE` takes precedence when set; the current
    /// directory is used when neither is given.
    #[arg(value_name = "BUNDLE")]
    pub bundle: Option<PathBuf>,

    /// Optional host config file (TOML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HEADLESS_HOST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and validate the bundle, print it, but don't start the engine.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
