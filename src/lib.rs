// src/lib.rs

pub mod bundle;
pub mod cli;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod host;
pub mod logging;
pub mod sched;
pub mod shutdown;

use tracing::{debug, info};

use crate::bundle::{BUNDLE_ENV_VAR, SnapshotPayloadLoader, resolve_bundle_root};
use crate::cli::CliArgs;
use crate::config::{HostConfig, load_or_default};
use crate::engine::FramePacerLauncher;
use crate::errors::Result;
use crate::fs::RealFileSystem;
use crate::host::{Host, PreparedBundle};
use crate::shutdown::OsSignals;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - bundle resolution and payload loading
/// - signal handling
/// - engine launch and the designated-thread run loop
///
/// Must be called on the thread that should run engine tasks.
pub fn run(args: CliArgs) -> Result<()> {
    let fs = RealFileSystem;
    let config = load_or_default(args.config.as_deref())?;

    let root = resolve_bundle_root(&fs, std::env::var_os(BUNDLE_ENV_VAR), args.bundle.clone())?;
    let bundle = PreparedBundle::prepare(&fs, &SnapshotPayloadLoader::native(), &root, &config)?;

    if args.dry_run {
        print_dry_run(&config, &bundle);
        return Ok(());
    }

    let launcher = FramePacerLauncher::new(config.engine.pacer_options());
    let mut signals = OsSignals::new()?;
    let host = Host::new(config);
    let adapter = host.adapter().clone();

    let summary = host.run(bundle, &launcher, &mut signals)?;
    info!(
        executed = summary.executed,
        frames = adapter.frames_presented(),
        idle_waits = summary.idle_waits,
        timed_waits = summary.timed_waits,
        "clean shutdown"
    );
    Ok(())
}

/// Print the resolved bundle and the effective config.
fn print_dry_run(config: &HostConfig, bundle: &PreparedBundle) {
    println!("headless-host dry-run");
    println!("  bundle root:  {}", bundle.layout.root.display());
    println!("  assets:       {}", bundle.layout.assets_path.display());
    println!("  icu data:     {}", bundle.layout.icu_data_path.display());
    println!(
        "  payload:      {} ({}, {} bytes)",
        bundle.payload.path.display(),
        bundle.payload.format,
        bundle.payload.size
    );
    println!("  fingerprint:  {}", bundle.payload.fingerprint);
    println!();
    println!(
        "  scheduler.idle_quantum_ms = {}",
        config.scheduler.idle_quantum_ms
    );
    println!("  scheduler.runner_id = {}", config.scheduler.runner_id);
    println!(
        "  engine = {}x{} @ {} fps",
        config.engine.surface_width, config.engine.surface_height, config.engine.frame_rate
    );

    debug!("dry-run complete (engine not started)");
}
