// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{AppConfig, ConfigOverrides, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load the config file (if any), layer CLI/env overrides on top and validate.
///
/// - An explicit `path` must exist.
/// - Without one, [`default_config_path`] is used only if it exists;
///   otherwise the built-in defaults apply.
pub fn load_and_validate(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<AppConfig> {
    let mut raw = match path {
        Some(p) => load_from_path(p)?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = %default_path.display(), "loading default config file");
                load_from_path(&default_path)?
            } else {
                RawConfigFile::default()
            }
        }
    };

    raw.apply_overrides(overrides);
    AppConfig::try_from(raw)
}

/// Default config location: `dlbot.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("dlbot.toml")
}
