// tests/bundle_layout.rs

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use headless_host::bundle::{BundleLayout, TargetPlatform, resolve_bundle_root};
use headless_host::config::BundleSection;
use headless_host::errors::HostError;
use headless_host::fs::mock::MockFileSystem;
use headless_host_test_utils::builders::mock_bundle;

#[test]
fn environment_overrides_argument() {
    let fs = MockFileSystem::new();
    let root = resolve_bundle_root(
        &fs,
        Some(OsString::from("/from/env")),
        Some(PathBuf::from("/from/arg")),
    )
    .unwrap();
    assert_eq!(root, PathBuf::from("/from/env"));
}

#[test]
fn empty_environment_value_is_ignored() {
    let fs = MockFileSystem::new();
    let root = resolve_bundle_root(&fs, Some(OsString::new()), Some(PathBuf::from("/from/arg")))
        .unwrap();
    assert_eq!(root, PathBuf::from("/from/arg"));
}

#[test]
fn falls_back_to_current_directory() {
    let fs = MockFileSystem::with_current_dir("/srv/app");
    let root = resolve_bundle_root(&fs, None, None).unwrap();
    assert_eq!(root, PathBuf::from("/srv/app"));
}

#[test]
fn complete_bundle_resolves() {
    let fs = MockFileSystem::new();
    let root = Path::new("/bundle");
    let payload = mock_bundle(&fs, root, TargetPlatform::Linux);

    let layout =
        BundleLayout::resolve_for(&fs, root, &BundleSection::default(), TargetPlatform::Linux)
            .unwrap();
    assert_eq!(layout.root, root);
    assert_eq!(layout.assets_path, root.join("flutter_assets"));
    assert_eq!(layout.icu_data_path, root.join("icudtl.dat"));
    assert_eq!(layout.payload_path, payload);
}

#[test]
fn missing_assets_is_reported_first() {
    let fs = MockFileSystem::new();
    fs.add_file("/bundle/icudtl.dat", b"icu".to_vec());

    let err = BundleLayout::resolve_for(
        &fs,
        Path::new("/bundle"),
        &BundleSection::default(),
        TargetPlatform::Linux,
    )
    .unwrap_err();
    match err {
        HostError::MissingAssets(path) => assert_eq!(path, PathBuf::from("/bundle/flutter_assets")),
        other => panic!("expected MissingAssets, got {other:?}"),
    }
}

#[test]
fn assets_must_be_a_directory() {
    let fs = MockFileSystem::new();
    fs.add_file("/bundle/flutter_assets", b"not a dir".to_vec());
    fs.add_file("/bundle/icudtl.dat", b"icu".to_vec());

    let err = BundleLayout::resolve_for(
        &fs,
        Path::new("/bundle"),
        &BundleSection::default(),
        TargetPlatform::Linux,
    )
    .unwrap_err();
    assert!(matches!(err, HostError::MissingAssets(_)));
}

#[test]
fn missing_icu_data_is_fatal() {
    let fs = MockFileSystem::new();
    fs.add_dir("/bundle/flutter_assets");

    let err = BundleLayout::resolve_for(
        &fs,
        Path::new("/bundle"),
        &BundleSection::default(),
        TargetPlatform::Linux,
    )
    .unwrap_err();
    match err {
        HostError::MissingIcuData(path) => assert_eq!(path, PathBuf::from("/bundle/icudtl.dat")),
        other => panic!("expected MissingIcuData, got {other:?}"),
    }
}

#[test]
fn missing_payload_carries_build_hint() {
    let fs = MockFileSystem::new();
    fs.add_dir("/bundle/flutter_assets");
    fs.add_file("/bundle/icudtl.dat", b"icu".to_vec());

    let err = BundleLayout::resolve_for(
        &fs,
        Path::new("/bundle"),
        &BundleSection::default(),
        TargetPlatform::Linux,
    )
    .unwrap_err();
    assert!(err.is_fatal());

    let rendered = err.to_string();
    assert!(rendered.contains("/bundle/libapp.so"), "{rendered}");
    assert!(rendered.contains("flutter assemble"), "{rendered}");
    assert!(rendered.contains("-dTargetPlatform=linux"), "{rendered}");
}

#[test]
fn windows_prefers_app_so_then_libapp_dll() {
    let fs = MockFileSystem::new();
    fs.add_dir("/bundle/flutter_assets");
    fs.add_file("/bundle/icudtl.dat", b"icu".to_vec());
    fs.add_file("/bundle/libapp.dll", b"MZ".to_vec());

    let layout = BundleLayout::resolve_for(
        &fs,
        Path::new("/bundle"),
        &BundleSection::default(),
        TargetPlatform::Windows,
    )
    .unwrap();
    assert_eq!(layout.payload_path, PathBuf::from("/bundle/libapp.dll"));

    fs.add_file("/bundle/app.so", b"\x7fELF".to_vec());
    let layout = BundleLayout::resolve_for(
        &fs,
        Path::new("/bundle"),
        &BundleSection::default(),
        TargetPlatform::Windows,
    )
    .unwrap();
    assert_eq!(layout.payload_path, PathBuf::from("/bundle/app.so"));
}

#[test]
fn macos_looks_inside_the_app_framework_first() {
    let fs = MockFileSystem::new();
    let root = Path::new("/bundle");
    let payload = mock_bundle(&fs, root, TargetPlatform::MacOs);
    assert_eq!(payload, root.join("App.framework/Versions/A/App"));

    let layout =
        BundleLayout::resolve_for(&fs, root, &BundleSection::default(), TargetPlatform::MacOs)
            .unwrap();
    assert_eq!(layout.payload_path, payload);
}

#[test]
fn macos_missing_payload_names_the_dylib_fallback() {
    let fs = MockFileSystem::new();
    fs.add_dir("/bundle/flutter_assets");
    fs.add_file("/bundle/icudtl.dat", b"icu".to_vec());

    let err = BundleLayout::resolve_for(
        &fs,
        Path::new("/bundle"),
        &BundleSection::default(),
        TargetPlatform::MacOs,
    )
    .unwrap_err();
    match err {
        HostError::MissingPayload { path, hint } => {
            assert_eq!(path, PathBuf::from("/bundle/libapp.dylib"));
            assert!(hint.contains("-dTargetPlatform=darwin"));
        }
        other => panic!("expected MissingPayload, got {other:?}"),
    }
}

#[test]
fn configured_names_and_payload_override_defaults() {
    let fs = MockFileSystem::new();
    fs.add_dir("/bundle/data/flutter_assets");
    fs.add_file("/bundle/data/icudtl.dat", b"icu".to_vec());
    fs.add_file("/bundle/lib/custom.so", b"\x7fELF".to_vec());

    let section = BundleSection {
        assets_dir: "data/flutter_assets".to_string(),
        icu_data: "data/icudtl.dat".to_string(),
        payload: Some(PathBuf::from("lib/custom.so")),
    };
    let layout =
        BundleLayout::resolve_for(&fs, Path::new("/bundle"), &section, TargetPlatform::Linux)
            .unwrap();
    assert_eq!(layout.assets_path, PathBuf::from("/bundle/data/flutter_assets"));
    assert_eq!(layout.payload_path, PathBuf::from("/bundle/lib/custom.so"));
}
