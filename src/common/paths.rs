use anyhow::{Context, Result};
use std::path::PathBuf;

/// Centralized path management for podman-wsl-setup

const APP_DIR: &str = "podman-wsl-setup";

/// Get the directory holding the optional config file.
///
/// Unlike the data directories of a long-lived tool this is never created:
/// a missing directory simply means no config file.
pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join(APP_DIR))
}

/// Default location of the config file
pub fn default_config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Default shell profile that receives the `DOCKER_HOST` export
pub fn default_profile() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from(shellexpand::tilde("~").to_string()))
        .join(".bashrc")
}

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}
