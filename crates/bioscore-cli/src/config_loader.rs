//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use bioscore_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "bioscore.toml";

/// Load layered configuration: defaults, file, environment, then CLI overrides
///
/// An explicit `config_file` must exist; the default file is optional.
pub fn load_config(config_file: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    let path = config_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if config_file.is_some() || path.exists() {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides).context("Invalid command-line override")?;
    Ok(config)
}
