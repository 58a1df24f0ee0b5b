//! Optional TOML configuration
//!
//! Every field has a default, so an empty or missing file yields the stock
//! WSL2 Ubuntu setup. A file only needs the keys it overrides:
//!
//! ```toml
//! canary_image = "docker.io/library/hello-world"
//! profile = "~/.zshrc"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::paths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupConfig {
    /// Packages always installed
    pub base_packages: Vec<String>,
    /// Modern network sandbox, installed only when the archive carries it
    pub network_package: String,
    /// Package providing the `docker` shim
    pub shim_package: String,
    /// Image run to prove networking and storage work
    pub canary_image: String,
    /// First subordinate id handed to the user
    pub subid_base: u32,
    /// Number of subordinate ids handed to the user
    pub subid_count: u32,
    pub subuid_path: PathBuf,
    pub subgid_path: PathBuf,
    /// Shell profile receiving the DOCKER_HOST export
    pub profile: Option<String>,
    /// User unit exposing the Docker-compatible socket
    pub socket_unit: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            base_packages: [
                "podman",
                "uidmap",
                "dbus-user-session",
                "fuse-overlayfs",
                "slirp4netns",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            network_package: "passt".to_string(),
            shim_package: "podman-docker".to_string(),
            canary_image: "quay.io/podman/hello".to_string(),
            subid_base: 100_000,
            subid_count: 65_536,
            subuid_path: PathBuf::from("/etc/subuid"),
            subgid_path: PathBuf::from("/etc/subgid"),
            profile: None,
            socket_unit: "podman.socket".to_string(),
        }
    }
}

impl SetupConfig {
    /// Load the config.
    ///
    /// An explicit path must exist. The default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = paths::default_config_file()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.subid_count == 0 {
            anyhow::bail!("subid_count must be greater than zero");
        }
        if self.subid_base.checked_add(self.subid_count - 1).is_none() {
            anyhow::bail!(
                "subordinate id range {}+{} overflows",
                self.subid_base,
                self.subid_count
            );
        }
        if self.base_packages.is_empty() {
            anyhow::bail!("base_packages must not be empty");
        }
        Ok(())
    }

    /// Last id in the subordinate range (inclusive)
    pub fn subid_end(&self) -> u32 {
        self.subid_base + (self.subid_count - 1)
    }

    pub fn profile_path(&self) -> PathBuf {
        match &self.profile {
            Some(raw) => paths::expand_path(raw),
            None => paths::default_profile(),
        }
    }
}
