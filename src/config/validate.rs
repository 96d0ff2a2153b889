// src/config/validate.rs

use std::path::{Component, Path};

use crate::config::model::{HostConfig, RawConfigFile};
use crate::engine::MAX_SURFACE_DIMENSION;
use crate::errors::{HostError, Result};

impl TryFrom<RawConfigFile> for HostConfig {
    type Error = HostError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(HostConfig::new_unchecked(raw.scheduler, raw.bundle, raw.engine))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_scheduler(cfg)?;
    validate_bundle(cfg)?;
    validate_engine(cfg)?;
    Ok(())
}

fn validate_scheduler(cfg: &RawConfigFile) -> Result<()> {
    let quantum = cfg.scheduler.idle_quantum_ms;
    if !(1..=1000).contains(&quantum) {
        return Err(HostError::Config(format!(
            "[scheduler].idle_quantum_ms must be between 1 and 1000 (got {quantum})"
        )));
    }

    if cfg.scheduler.max_pending_tasks == Some(0) {
        return Err(HostError::Config(
            "[scheduler].max_pending_tasks must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_bundle(cfg: &RawConfigFile) -> Result<()> {
    ensure_bundle_name("assets_dir", &cfg.bundle.assets_dir)?;
    ensure_bundle_name("icu_data", &cfg.bundle.icu_data)?;

    if let Some(payload) = &cfg.bundle.payload {
        if payload.as_os_str().is_empty() {
            return Err(HostError::Config(
                "[bundle].payload must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Names inside the bundle must stay inside the bundle.
fn ensure_bundle_name(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HostError::Config(format!(
            "[bundle].{key} must not be empty"
        )));
    }

    let path = Path::new(value);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(HostError::Config(format!(
            "[bundle].{key} must be a relative path inside the bundle (got {value:?})"
        )));
    }
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    let rate = cfg.engine.frame_rate;
    if !(1..=240).contains(&rate) {
        return Err(HostError::Config(format!(
            "[engine].frame_rate must be between 1 and 240 (got {rate})"
        )));
    }

    let dimension = 1..=MAX_SURFACE_DIMENSION;
    if !dimension.contains(&cfg.engine.surface_width)
        || !dimension.contains(&cfg.engine.surface_height)
    {
        return Err(HostError::Config(format!(
            "[engine] surface must be between 1x1 and {MAX_SURFACE_DIMENSION}x{MAX_SURFACE_DIMENSION} (got {}x{})",
            cfg.engine.surface_width, cfg.engine.surface_height
        )));
    }
    Ok(())
}
