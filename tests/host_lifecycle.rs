// tests/host_lifecycle.rs

mod common;

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use headless_host::bundle::{SnapshotPayloadLoader, TargetPlatform};
use headless_host::config::{HostConfig, RawConfigFile, SchedulerSection};
use headless_host::engine::{FramePacerLauncher, PacerOptions};
use headless_host::errors::{HostError, Result};
use headless_host::fs::RealFileSystem;
use headless_host::fs::mock::MockFileSystem;
use headless_host::host::{Host, PreparedBundle};
use headless_host::sched::ShutdownHandle;
use headless_host::shutdown::{ManualShutdown, ShutdownSource};
use headless_host_test_utils::builders::{BundleBuilder, mock_bundle};
use headless_host_test_utils::fake_engine::{FailingLauncher, ScriptedLauncher};

use common::{MS, Recorder, init_tracing, wait_until};

fn mock_prepared(config: &HostConfig) -> PreparedBundle {
    let fs = MockFileSystem::new();
    let root = Path::new("/bundle");
    mock_bundle(&fs, root, TargetPlatform::current());
    PreparedBundle::prepare(&fs, &SnapshotPayloadLoader::native(), root, config).unwrap()
}

/// Shutdown source that fires as soon as it is installed.
#[derive(Debug, Default)]
struct ImmediateShutdown;

impl ShutdownSource for ImmediateShutdown {
    fn install(&mut self, handle: ShutdownHandle) -> Result<()> {
        handle.request();
        Ok(())
    }
}

#[test]
fn engine_tasks_run_then_engine_is_stopped() {
    init_tracing();
    let config = HostConfig::default();
    let bundle = mock_prepared(&config);
    let host = Host::new(config);
    let stop = host.shutdown_handle();
    let observer = host.shutdown_handle();
    assert!(!observer.is_requested());

    let rec = Recorder::new();
    let script_rec = rec.clone();
    let launcher = ScriptedLauncher::new(rec.clone(), move |adapter| {
        let now = adapter.now_nanos();
        let stop = stop.clone();
        let r = script_rec.clone();
        adapter.post_task(now + 20 * MS, move || {
            r.record("late".to_string());
            stop.request();
        })?;
        adapter.post_task(now + 10 * MS, script_rec.callback("middle".to_string()))?;
        adapter.post_task(now, script_rec.callback("first".to_string()))?;
        adapter.post_task(now + 10_000 * MS, script_rec.callback("never".to_string()))?;
        Ok(())
    });

    let summary = host
        .run(bundle, &launcher, &mut ManualShutdown)
        .unwrap();

    assert!(observer.is_requested());
    assert_eq!(
        rec.snapshot(),
        vec![
            "launch runner=1 designated=true".to_string(),
            "first".to_string(),
            "middle".to_string(),
            "late".to_string(),
            "shutdown".to_string(),
        ]
    );
    assert_eq!(summary.executed, 3);
}

#[test]
fn configured_runner_id_reaches_the_engine() {
    init_tracing();
    let config = HostConfig::try_from(RawConfigFile {
        scheduler: SchedulerSection {
            runner_id: 42,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();
    let bundle = mock_prepared(&config);
    let host = Host::new(config);

    let rec = Recorder::new();
    let launcher = ScriptedLauncher::new(rec.clone(), |_| Ok(()));
    host.run(bundle, &launcher, &mut ImmediateShutdown).unwrap();

    assert_eq!(
        rec.snapshot(),
        vec![
            "launch runner=42 designated=true".to_string(),
            "shutdown".to_string(),
        ]
    );
}

#[test]
fn shutdown_before_the_loop_discards_posted_tasks() {
    init_tracing();
    let config = HostConfig::default();
    let bundle = mock_prepared(&config);
    let host = Host::new(config);
    let context = Arc::clone(host.context());

    let rec = Recorder::new();
    let script_rec = rec.clone();
    let launcher = ScriptedLauncher::new(rec.clone(), move |adapter| {
        adapter.post_task(adapter.now_nanos(), script_rec.callback("ran".to_string()))
    });

    let summary = host
        .run(bundle, &launcher, &mut ImmediateShutdown)
        .unwrap();

    assert_eq!(summary.executed, 0);
    assert_eq!(context.pending(), 0);
    assert!(!rec.snapshot().contains(&"ran".to_string()));
    assert_eq!(rec.snapshot().last().map(String::as_str), Some("shutdown"));
}

#[test]
fn engine_start_failure_is_reported() {
    init_tracing();
    let config = HostConfig::default();
    let bundle = mock_prepared(&config);
    let host = Host::new(config);

    let err = host
        .run(bundle, &FailingLauncher, &mut ManualShutdown)
        .unwrap_err();
    assert!(matches!(err, HostError::EngineStart(_)), "{err:?}");
    assert!(err.is_fatal());
}

#[test]
fn script_failure_during_launch_propagates() {
    init_tracing();
    let config = HostConfig::default();
    let bundle = mock_prepared(&config);
    let host = Host::new(config);

    let rec = Recorder::new();
    let launcher = ScriptedLauncher::new(rec.clone(), |_| {
        Err(HostError::EngineStart("no surface".to_string()))
    });
    let err = host
        .run(bundle, &launcher, &mut ManualShutdown)
        .unwrap_err();
    assert!(err.to_string().contains("no surface"), "{err}");
}

#[test]
fn frame_pacer_presents_frames_until_shutdown() {
    init_tracing();
    let on_disk = BundleBuilder::new().build();
    let config = HostConfig::default();
    let bundle = PreparedBundle::prepare(
        &RealFileSystem,
        &SnapshotPayloadLoader::native(),
        on_disk.path(),
        &config,
    )
    .unwrap();

    let host = Host::new(config);
    let adapter = host.adapter().clone();
    let stop = host.shutdown_handle();

    let stopper = {
        let adapter = adapter.clone();
        thread::spawn(move || {
            wait_until(Duration::from_secs(2), || adapter.frames_presented() >= 3);
            stop.request();
        })
    };

    let launcher = FramePacerLauncher::new(PacerOptions {
        frame_rate: 60,
        surface_width: 64,
        surface_height: 32,
    });
    let started = Instant::now();
    let summary = host
        .run(bundle, &launcher, &mut ManualShutdown)
        .unwrap();
    stopper.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(adapter.frames_presented() >= 3, "{}", adapter.frames_presented());
    assert!(summary.executed >= 1);
}

#[test]
fn frame_pacer_rejects_an_empty_surface() {
    init_tracing();
    let config = HostConfig::default();
    let bundle = mock_prepared(&config);
    let host = Host::new(config);

    let launcher = FramePacerLauncher::new(PacerOptions {
        frame_rate: 60,
        surface_width: 0,
        surface_height: 600,
    });
    let err = host
        .run(bundle, &launcher, &mut ManualShutdown)
        .unwrap_err();
    assert!(matches!(err, HostError::EngineStart(_)), "{err:?}");
}

#[test]
fn frame_pacer_rejects_an_oversized_surface() {
    init_tracing();
    let config = HostConfig::default();
    let bundle = mock_prepared(&config);
    let host = Host::new(config);
    let adapter = host.adapter().clone();

    let launcher = FramePacerLauncher::new(PacerOptions {
        frame_rate: 60,
        surface_width: u32::MAX,
        surface_height: u32::MAX,
    });
    let err = host
        .run(bundle, &launcher, &mut ManualShutdown)
        .unwrap_err();
    assert!(matches!(err, HostError::EngineStart(_)), "{err:?}");
    assert_eq!(adapter.frames_presented(), 0);
}

#[test]
fn full_queue_drops_the_post_and_keeps_running() {
    init_tracing();
    let config = HostConfig::try_from(RawConfigFile {
        scheduler: SchedulerSection {
            max_pending_tasks: Some(2),
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();
    let bundle = mock_prepared(&config);
    let host = Host::new(config);
    let stop = host.shutdown_handle();

    let rec = Recorder::new();
    let script_rec = rec.clone();
    let launcher = ScriptedLauncher::new(rec.clone(), move |adapter| {
        let now = adapter.now_nanos();
        adapter.post_task(now, script_rec.callback("first".to_string()))?;

        let r = script_rec.clone();
        let stop = stop.clone();
        adapter.post_task(now + 10 * MS, move || {
            r.record("second".to_string());
            stop.request();
        })?;

        match adapter.post_task(now, script_rec.callback("dropped".to_string())) {
            Err(err @ HostError::QueueGrowth { .. }) => {
                assert!(!err.is_fatal());
                script_rec.record("rejected".to_string());
                Ok(())
            }
            other => panic!("expected QueueGrowth, got {other:?}"),
        }
    });

    let summary = host
        .run(bundle, &launcher, &mut ManualShutdown)
        .unwrap();

    assert_eq!(
        rec.snapshot(),
        vec![
            "launch runner=1 designated=true".to_string(),
            "rejected".to_string(),
            "first".to_string(),
            "second".to_string(),
            "shutdown".to_string(),
        ]
    );
    assert_eq!(summary.executed, 2);
}

#[test]
fn missing_bundle_pieces_fail_preparation() {
    let config = HostConfig::default();
    let on_disk = BundleBuilder::new().without_icu().build();
    let err = PreparedBundle::prepare(
        &RealFileSystem,
        &SnapshotPayloadLoader::native(),
        on_disk.path(),
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, HostError::MissingIcuData(_)), "{err:?}");

    let on_disk = BundleBuilder::new().without_payload().build();
    let err = PreparedBundle::prepare(
        &RealFileSystem,
        &SnapshotPayloadLoader::native(),
        on_disk.path(),
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, HostError::MissingPayload { .. }), "{err:?}");
}
