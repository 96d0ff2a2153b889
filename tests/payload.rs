// tests/payload.rs

use std::path::Path;

use headless_host::bundle::{
    PayloadFormat, PayloadLoader, SnapshotPayloadLoader, TargetPlatform,
};
use headless_host::errors::HostError;
use headless_host::fs::mock::MockFileSystem;
use headless_host_test_utils::builders::PayloadBuilder;

fn load(platform: TargetPlatform, bytes: Vec<u8>) -> Result<headless_host::bundle::AotPayload, HostError> {
    let fs = MockFileSystem::new();
    fs.add_file("/bundle/payload", bytes);
    SnapshotPayloadLoader::for_platform(platform).load(&fs, Path::new("/bundle/payload"))
}

#[test]
fn detects_object_formats() {
    assert_eq!(PayloadFormat::detect(b"\x7fELF\x02\x01"), Some(PayloadFormat::Elf));
    assert_eq!(PayloadFormat::detect(&[0xcf, 0xfa, 0xed, 0xfe]), Some(PayloadFormat::MachO));
    assert_eq!(PayloadFormat::detect(&[0xfe, 0xed, 0xfa, 0xce]), Some(PayloadFormat::MachO));
    assert_eq!(PayloadFormat::detect(&[0xca, 0xfe, 0xba, 0xbe]), Some(PayloadFormat::MachO));
    assert_eq!(PayloadFormat::detect(b"MZ\x90\x00"), Some(PayloadFormat::Pe));
    assert_eq!(PayloadFormat::detect(b"\x7fEL"), None);
    assert_eq!(PayloadFormat::detect(b""), None);
}

#[test]
fn valid_elf_payload_loads_with_fingerprint() {
    let bytes = PayloadBuilder::new(PayloadFormat::Elf).build();
    let payload = load(TargetPlatform::Linux, bytes.clone()).unwrap();

    assert_eq!(payload.format, PayloadFormat::Elf);
    assert_eq!(payload.size, bytes.len() as u64);
    assert_eq!(payload.fingerprint, blake3_hex(&bytes));
    assert_eq!(payload.fingerprint.len(), 64);
}

#[test]
fn windows_accepts_elf_and_pe() {
    assert!(load(TargetPlatform::Windows, PayloadBuilder::new(PayloadFormat::Elf).build()).is_ok());
    assert!(load(TargetPlatform::Windows, PayloadBuilder::new(PayloadFormat::Pe).build()).is_ok());
}

#[test]
fn wrong_format_for_platform_is_a_load_failure() {
    let err = load(TargetPlatform::MacOs, PayloadBuilder::new(PayloadFormat::Elf).build()).unwrap_err();
    match err {
        HostError::PayloadLoad { reason, .. } => assert!(reason.contains("ELF"), "{reason}"),
        other => panic!("expected PayloadLoad, got {other:?}"),
    }
}

#[test]
fn unrecognised_file_is_a_load_failure() {
    let err = load(TargetPlatform::Linux, PayloadBuilder::unrecognised().build()).unwrap_err();
    assert!(matches!(err, HostError::PayloadLoad { .. }));
}

#[test]
fn unreadable_payload_is_a_load_failure() {
    let fs = MockFileSystem::new();
    let err = SnapshotPayloadLoader::for_platform(TargetPlatform::Linux)
        .load(&fs, Path::new("/nowhere/libapp.so"))
        .unwrap_err();
    match err {
        HostError::PayloadLoad { path, .. } => assert_eq!(path, Path::new("/nowhere/libapp.so")),
        other => panic!("expected PayloadLoad, got {other:?}"),
    }
}

#[test]
fn every_missing_snapshot_symbol_is_listed() {
    let bytes = PayloadBuilder::new(PayloadFormat::MachO)
        .without_symbol("kDartVmSnapshotInstructions")
        .without_symbol("kDartIsolateSnapshotData")
        .build();

    let err = load(TargetPlatform::MacOs, bytes).unwrap_err();
    match err {
        HostError::MissingSymbols { missing, .. } => {
            assert_eq!(
                missing,
                vec![
                    "kDartVmSnapshotInstructions".to_string(),
                    "kDartIsolateSnapshotData".to_string(),
                ]
            );
        }
        other => panic!("expected MissingSymbols, got {other:?}"),
    }
}

#[test]
fn symbol_prefix_does_not_count_as_the_symbol() {
    // Only "kDartVmSnapshotDataX" is present, not "kDartVmSnapshotData".
    let mut bytes = PayloadBuilder::new(PayloadFormat::Elf)
        .without_symbol("kDartVmSnapshotData")
        .build();
    bytes.extend_from_slice(b"kDartVmSnapshotDataX\0");

    let err = load(TargetPlatform::Linux, bytes).unwrap_err();
    assert!(matches!(err, HostError::MissingSymbols { .. }));
}

fn blake3_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
