// src/bundle/layout.rs

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::payload::PayloadFormat;
use crate::config::BundleSection;
use crate::errors::{HostError, Result};
use crate::fs::FileSystem;

/// Environment variable that overrides the bundle root.
pub const BUNDLE_ENV_VAR: &str = "HEADLESS_HOST_BUNDLE";

/// Target platform, for the parts of the bundle layout that differ per OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPlatform {
    Linux,
    Windows,
    MacOs,
}

impl TargetPlatform {
    /// The platform this binary was built for.
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            TargetPlatform::Windows
        } else if cfg!(target_os = "macos") {
            TargetPlatform::MacOs
        } else {
            TargetPlatform::Linux
        }
    }

    /// Payload file names to try, in order, relative to the bundle root.
    pub fn payload_candidates(self) -> &'static [&'static str] {
        match self {
            TargetPlatform::Linux => &["libapp.so"],
            TargetPlatform::Windows => &["app.so", "libapp.dll"],
            TargetPlatform::MacOs => &["App.framework/Versions/A/App", "libapp.dylib"],
        }
    }

    /// Object formats the native payload loader accepts.
    pub fn payload_formats(self) -> &'static [PayloadFormat] {
        match self {
            TargetPlatform::Linux => &[PayloadFormat::Elf],
            TargetPlatform::Windows => &[PayloadFormat::Elf, PayloadFormat::Pe],
            TargetPlatform::MacOs => &[PayloadFormat::MachO],
        }
    }

    /// Command that produces a release bundle for this platform.
    pub fn build_hint(self) -> &'static str {
        match self {
            TargetPlatform::Linux => {
                "flutter assemble --output=build/linux-x64 -dTargetPlatform=linux \
                 -dLinuxArchs=x64 -dBuildMode=release -dTreeShakeIcons=true \
                 release_linux_bundle_flutter_assets"
            }
            TargetPlatform::Windows => {
                "flutter assemble --output=build/windows-x64 -dTargetPlatform=windows-x64 \
                 -dBuildMode=release -dTreeShakeIcons=true \
                 release_bundle_windows-x64_assets"
            }
            TargetPlatform::MacOs => {
                "flutter assemble --output=build/macos-arm64 -dTargetPlatform=darwin \
                 -dDarwinArchs=arm64 -dBuildMode=release -dTreeShakeIcons=true \
                 release_macos_bundle_flutter_assets"
            }
        }
    }
}

/// Pick the bundle root.
///
/// Priority:
/// 1. `HEADLESS_HOST_BUNDLE`, when set and non-empty
/// 2. the positional CLI argument
/// 3. the current working directory
pub fn resolve_bundle_root(
    fs: &dyn FileSystem,
    env_value: Option<OsString>,
    arg: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(env_value) = env_value.filter(|v| !v.is_empty()) {
        debug!(var = BUNDLE_ENV_VAR, "bundle root taken from environment");
        return Ok(PathBuf::from(env_value));
    }
    if let Some(arg) = arg {
        return Ok(arg);
    }
    Ok(fs.current_dir()?)
}

/// Paths of everything the engine needs, all checked to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    pub root: PathBuf,
    pub assets_path: PathBuf,
    pub icu_data_path: PathBuf,
    pub payload_path: PathBuf,
}

impl BundleLayout {
    /// Resolve and check the layout for the current platform.
    pub fn resolve(fs: &dyn FileSystem, root: &Path, section: &BundleSection) -> Result<Self> {
        Self::resolve_for(fs, root, section, TargetPlatform::current())
    }

    /// Resolve and check the layout as `platform` would lay it out.
    ///
    /// Checks run in order: assets directory, ICU data, payload. The first
    /// missing piece is reported.
    pub fn resolve_for(
        fs: &dyn FileSystem,
        root: &Path,
        section: &BundleSection,
        platform: TargetPlatform,
    ) -> Result<Self> {
        if !fs.exists(root) {
            warn!(root = %root.display(), "bundle root does not exist");
        }

        let assets_path = root.join(&section.assets_dir);
        if !fs.is_dir(&assets_path) {
            return Err(HostError::MissingAssets(assets_path));
        }

        let icu_data_path = root.join(&section.icu_data);
        if !fs.is_file(&icu_data_path) {
            return Err(HostError::MissingIcuData(icu_data_path));
        }

        let payload_path = match &section.payload {
            Some(explicit) => root.join(explicit),
            None => find_payload(fs, root, platform),
        };
        if !fs.is_file(&payload_path) {
            return Err(HostError::MissingPayload {
                path: payload_path,
                hint: platform.build_hint().to_string(),
            });
        }

        debug!(
            root = %root.display(),
            payload = %payload_path.display(),
            "bundle layout resolved"
        );

        Ok(Self {
            root: root.to_path_buf(),
            assets_path,
            icu_data_path,
            payload_path,
        })
    }
}

/// First candidate that exists; the last candidate when none do, so the
/// error names the most generic file name.
fn find_payload(fs: &dyn FileSystem, root: &Path, platform: TargetPlatform) -> PathBuf {
    let candidates = platform.payload_candidates();
    candidates
        .iter()
        .map(|name| root.join(name))
        .find(|path| fs.is_file(path))
        .unwrap_or_else(|| root.join(candidates[candidates.len() - 1]))
}
