#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use headless_host::bundle::{PayloadFormat, REQUIRED_SYMBOLS, TargetPlatform};
use headless_host::fs::mock::MockFileSystem;
use tempfile::TempDir;

/// Builder for fake AOT payload bytes: a format header followed by a string
/// table holding the chosen snapshot symbols.
pub struct PayloadBuilder {
    format: Option<PayloadFormat>,
    symbols: Vec<&'static str>,
}

impl PayloadBuilder {
    pub fn new(format: PayloadFormat) -> Self {
        Self {
            format: Some(format),
            symbols: REQUIRED_SYMBOLS.to_vec(),
        }
    }

    /// Payload in the format the current platform loads.
    pub fn native() -> Self {
        Self::new(TargetPlatform::current().payload_formats()[0])
    }

    /// No recognisable header at all.
    pub fn unrecognised() -> Self {
        Self {
            format: None,
            symbols: REQUIRED_SYMBOLS.to_vec(),
        }
    }

    pub fn without_symbol(mut self, symbol: &str) -> Self {
        self.symbols.retain(|s| *s != symbol);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = match self.format {
            Some(PayloadFormat::Elf) => vec![0x7f, b'E', b'L', b'F', 2, 1, 1, 0],
            Some(PayloadFormat::MachO) => vec![0xcf, 0xfa, 0xed, 0xfe, 0x0c, 0, 0, 1],
            Some(PayloadFormat::Pe) => vec![b'M', b'Z', 0x90, 0, 3, 0, 0, 0],
            None => b"#!/bin/sh\n".to_vec(),
        };
        bytes.extend_from_slice(&[0u8; 56]);
        for symbol in self.symbols {
            bytes.push(0);
            bytes.push(b'_');
            bytes.extend_from_slice(symbol.as_bytes());
        }
        bytes.push(0);
        bytes
    }
}

/// Builder for an on-disk bundle in a temporary directory.
pub struct BundleBuilder {
    assets: bool,
    icu: bool,
    payload: Option<(String, Vec<u8>)>,
}

impl BundleBuilder {
    /// A complete bundle for the current platform.
    pub fn new() -> Self {
        let name = TargetPlatform::current().payload_candidates()[0].to_string();
        Self {
            assets: true,
            icu: true,
            payload: Some((name, PayloadBuilder::native().build())),
        }
    }

    pub fn without_assets(mut self) -> Self {
        self.assets = false;
        self
    }

    pub fn without_icu(mut self) -> Self {
        self.icu = false;
        self
    }

    pub fn without_payload(mut self) -> Self {
        self.payload = None;
        self
    }

    pub fn payload_bytes(mut self, bytes: Vec<u8>) -> Self {
        let name = TargetPlatform::current().payload_candidates()[0].to_string();
        self.payload = Some((name, bytes));
        self
    }

    pub fn build(self) -> TempBundle {
        let dir = tempfile::tempdir().expect("create temp bundle dir");
        let root = dir.path();

        if self.assets {
            fs::create_dir_all(root.join("flutter_assets")).unwrap();
            fs::write(root.join("flutter_assets/AssetManifest.json"), b"{}").unwrap();
        }
        if self.icu {
            fs::write(root.join("icudtl.dat"), b"icu").unwrap();
        }
        if let Some((name, bytes)) = self.payload {
            let path = root.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, bytes).unwrap();
        }

        TempBundle { dir }
    }
}

impl Default for BundleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bundle on disk, removed when dropped.
pub struct TempBundle {
    dir: TempDir,
}

impl TempBundle {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Lay out a complete in-memory bundle for `platform` under `root`, with the
/// payload at the platform's first candidate name. Returns the payload path.
pub fn mock_bundle(fs: &MockFileSystem, root: &Path, platform: TargetPlatform) -> PathBuf {
    fs.add_dir(root.join("flutter_assets"));
    fs.add_file(root.join("icudtl.dat"), b"icu".to_vec());
    let payload = root.join(platform.payload_candidates()[0]);
    fs.add_file(
        &payload,
        PayloadBuilder::new(platform.payload_formats()[0]).build(),
    );
    payload
}
