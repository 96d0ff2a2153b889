// src/bundle/payload.rs

//! AOT payload loading.
//!
//! The payload is the compiled application the engine runs. Loading it here
//! means: read it, check it is an object file of a format this platform can
//! use, and check that the four Dart snapshot symbols the engine resolves at
//! startup are present. The engine maps the file itself.

use std::fmt;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use tracing::info;

use super::layout::TargetPlatform;
use crate::errors::{HostError, Result};
use crate::fs::FileSystem;

/// Snapshot symbols every AOT payload must export.
pub const REQUIRED_SYMBOLS: [&str; 4] = [
    "kDartVmSnapshotData",
    "kDartVmSnapshotInstructions",
    "kDartIsolateSnapshotData",
    "kDartIsolateSnapshotInstructions",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Elf,
    MachO,
    Pe,
}

impl PayloadFormat {
    /// Identify the object format from the file's magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x7f, b'E', b'L', b'F', ..] => Some(PayloadFormat::Elf),
            [0xfe, 0xed, 0xfa, 0xce | 0xcf, ..]
            | [0xce | 0xcf, 0xfa, 0xed, 0xfe, ..]
            | [0xca, 0xfe, 0xba, 0xbe, ..] => Some(PayloadFormat::MachO),
            [b'M', b'Z', ..] => Some(PayloadFormat::Pe),
            _ => None,
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadFormat::Elf => "ELF",
            PayloadFormat::MachO => "Mach-O",
            PayloadFormat::Pe => "PE",
        };
        f.write_str(name)
    }
}

/// A payload that passed loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AotPayload {
    pub path: PathBuf,
    pub format: PayloadFormat,
    pub size: u64,
    /// blake3 of the file contents, hex encoded.
    pub fingerprint: String,
}

/// Capability for turning a payload path into an [`AotPayload`].
pub trait PayloadLoader: fmt::Debug {
    fn load(&self, fs: &dyn FileSystem, path: &Path) -> Result<AotPayload>;
}

/// Loader that validates object format and snapshot symbols.
#[derive(Debug, Clone)]
pub struct SnapshotPayloadLoader {
    accepted: &'static [PayloadFormat],
}

impl SnapshotPayloadLoader {
    /// Loader for the platform this binary was built for.
    pub fn native() -> Self {
        Self::for_platform(TargetPlatform::current())
    }

    pub fn for_platform(platform: TargetPlatform) -> Self {
        Self {
            accepted: platform.payload_formats(),
        }
    }
}

impl PayloadLoader for SnapshotPayloadLoader {
    fn load(&self, fs: &dyn FileSystem, path: &Path) -> Result<AotPayload> {
        let bytes = fs.read(path).map_err(|e| HostError::PayloadLoad {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        })?;

        let format = PayloadFormat::detect(&bytes).ok_or_else(|| HostError::PayloadLoad {
            path: path.to_path_buf(),
            reason: "not a recognised object file".to_string(),
        })?;

        if !self.accepted.contains(&format) {
            return Err(HostError::PayloadLoad {
                path: path.to_path_buf(),
                reason: format!("{format} payloads are not supported on this platform"),
            });
        }

        let missing: Vec<String> = REQUIRED_SYMBOLS
            .iter()
            .filter(|symbol| !contains_symbol(&bytes, symbol.as_bytes()))
            .map(|symbol| symbol.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(HostError::MissingSymbols {
                path: path.to_path_buf(),
                missing,
            });
        }

        let mut hasher = Hasher::new();
        hasher.update(&bytes);
        let fingerprint = hasher.finalize().to_hex().to_string();

        let payload = AotPayload {
            path: path.to_path_buf(),
            format,
            size: bytes.len() as u64,
            fingerprint,
        };

        info!(
            path = %payload.path.display(),
            format = %payload.format,
            size = payload.size,
            fingerprint = %payload.fingerprint,
            "loaded AOT payload"
        );
        Ok(payload)
    }
}

/// Symbol names appear in the string table as NUL-terminated names, possibly
/// with a leading underscore, so a terminated substring match is enough.
fn contains_symbol(haystack: &[u8], symbol: &[u8]) -> bool {
    haystack
        .windows(symbol.len() + 1)
        .any(|w| w[symbol.len()] == 0 && &w[..symbol.len()] == symbol)
}
