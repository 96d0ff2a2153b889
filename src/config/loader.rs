// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{HostConfig, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] to get
/// a usable `HostConfig`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<HostConfig> {
    let raw_config = load_from_path(&path)?;
    let config = HostConfig::try_from(raw_config)?;
    debug!(path = %path.as_ref().display(), ?config, "loaded host config");
    Ok(config)
}

/// Load the config file if one was given, defaults otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<HostConfig> {
    match path {
        Some(path) => load_and_validate(path),
        None => Ok(HostConfig::default()),
    }
}
