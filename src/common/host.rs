//! The external actions the setup performs, behind one trait.
//!
//! Every step talks to the machine through [`Host`] so the pipeline can be
//! driven against a fake in tests. [`SystemHost`] is the real thing.

use anyhow::{Context, Result, bail};
use duct::cmd;
use std::fs;
use std::path::{Path, PathBuf};

use super::apt;
use super::shell::command_line;
use super::subid::Allocation;
use super::systemd::{SystemState, SystemdManager};
use crate::ui::prelude::*;

pub const ENGINE: &str = "podman";
pub const SHIM: &str = "docker";

const PROC_VERSION: &str = "/proc/version";
const CGROUP_V2_MARKER: &str = "/sys/fs/cgroup/cgroup.controllers";
const ROOTLESS_FORMAT: &str = "{{.Host.Security.Rootless}}";

pub trait Host {
    /// Kernel version banner, `None` if unreadable
    fn kernel_version(&self) -> Option<String>;
    fn system_state(&self) -> SystemState;
    fn has_cgroup_v2(&self) -> bool;
    /// Propagation mode of `/`, `None` if it could not be queried
    fn root_propagation(&self) -> Option<String>;
    fn has_command(&self, name: &str) -> bool;

    fn package_available(&self, package: &str) -> bool;
    fn package_installed(&self, package: &str) -> bool;
    fn refresh_packages(&self) -> Result<()>;
    fn install_packages(&self, packages: &[&str]) -> Result<()>;

    fn add_subordinate_ids(&self, user: &str, allocation: Allocation) -> Result<()>;

    fn stop_all_containers(&self) -> Result<()>;
    fn migrate_storage(&self) -> Result<()>;
    /// Raw value of the engine's rootless field
    fn rootless_status(&self) -> Result<String>;
    fn run_canary(&self, image: &str) -> Result<()>;

    fn enable_user_socket(&self, unit: &str) -> Result<()>;
    /// Set a variable in this process's environment only
    fn export_env(&self, key: &str, value: &str);

    fn find_shim(&self) -> Option<PathBuf>;
    fn shim_info(&self, shim: &Path) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct SystemHost;

fn debug_exec(program: &str, args: &[&str]) {
    emit(Level::Debug, "host.exec", &command_line(program, args), None);
}

impl Host for SystemHost {
    fn kernel_version(&self) -> Option<String> {
        fs::read_to_string(PROC_VERSION).ok()
    }

    fn system_state(&self) -> SystemState {
        SystemdManager::system().system_state()
    }

    fn has_cgroup_v2(&self) -> bool {
        Path::new(CGROUP_V2_MARKER).exists()
    }

    fn root_propagation(&self) -> Option<String> {
        let args = ["-no", "PROPAGATION", "/"];
        debug_exec("findmnt", &args);
        cmd("findmnt", &args)
            .stderr_null()
            .read()
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn has_command(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }

    fn package_available(&self, package: &str) -> bool {
        apt::is_available(package)
    }

    fn package_installed(&self, package: &str) -> bool {
        apt::is_installed(package)
    }

    fn refresh_packages(&self) -> Result<()> {
        apt::update_index()
    }

    fn install_packages(&self, packages: &[&str]) -> Result<()> {
        apt::install(packages)
    }

    fn add_subordinate_ids(&self, user: &str, allocation: Allocation) -> Result<()> {
        let args = allocation.usermod_args(user);
        let borrowed: Vec<&str> = args.iter().map(String::as_str).collect();
        debug_exec("sudo", &borrowed);
        cmd("sudo", &args).run().with_context(|| {
            format!(
                "allocating subordinate ids {}-{} for {user}",
                allocation.first, allocation.last
            )
        })?;
        Ok(())
    }

    fn stop_all_containers(&self) -> Result<()> {
        let args = ["stop", "--all"];
        debug_exec(ENGINE, &args);
        cmd(ENGINE, &args)
            .stdout_null()
            .stderr_null()
            .run()
            .context("stopping containers")?;
        Ok(())
    }

    fn migrate_storage(&self) -> Result<()> {
        let args = ["system", "migrate"];
        debug_exec(ENGINE, &args);
        cmd(ENGINE, &args).run().context("podman system migrate")?;
        Ok(())
    }

    fn rootless_status(&self) -> Result<String> {
        let args = ["info", "--format", ROOTLESS_FORMAT];
        debug_exec(ENGINE, &args);
        let out = cmd(ENGINE, &args)
            .stderr_null()
            .read()
            .context("podman info")?;
        Ok(out.trim().to_string())
    }

    fn run_canary(&self, image: &str) -> Result<()> {
        let args = ["run", "--rm", image];
        debug_exec(ENGINE, &args);
        cmd(ENGINE, &args)
            .run()
            .with_context(|| format!("running canary image {image}"))?;
        Ok(())
    }

    fn enable_user_socket(&self, unit: &str) -> Result<()> {
        let user = SystemdManager::user();
        user.enable_and_start(unit)?;
        if !user.is_active(unit) {
            bail!("{unit} did not become active");
        }
        Ok(())
    }

    fn export_env(&self, key: &str, value: &str) {
        // SAFETY: the setup is single-threaded; nothing reads the environment concurrently.
        unsafe { std::env::set_var(key, value) };
    }

    fn find_shim(&self) -> Option<PathBuf> {
        which::which(SHIM).ok()
    }

    fn shim_info(&self, shim: &Path) -> Result<()> {
        debug_exec(&shim.to_string_lossy(), &["info"]);
        cmd(shim.to_path_buf(), ["info"])
            .stdout_null()
            .stderr_null()
            .run()
            .with_context(|| format!("{} info", shim.display()))?;
        Ok(())
    }
}
