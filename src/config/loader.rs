// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ClusterConfig, RawClusterFile};
use crate::errors::Result;

/// Load a cluster description from a given path and return the raw
/// `RawClusterFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawClusterFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawClusterFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a cluster description from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks templates, port range and timeout syntax.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ClusterConfig> {
    let raw_config = load_from_path(&path)?;
    let config = ClusterConfig::try_from(raw_config)?;
    Ok(config)
}
