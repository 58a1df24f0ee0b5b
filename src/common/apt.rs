//! APT backend for the dependency and shim steps.

use anyhow::{Context, Result};
use duct::cmd;

use super::shell::command_line;
use crate::ui::prelude::*;

/// Command and base arguments used to install packages. sudo drops the
/// caller's environment, so the frontend is passed as an assignment.
pub const INSTALL_COMMAND: (&str, &[&str]) = (
    "sudo",
    &["DEBIAN_FRONTEND=noninteractive", "apt-get", "install", "-y"],
);

fn debug_exec(program: &str, args: &[&str]) {
    emit(Level::Debug, "apt.exec", &command_line(program, args), None);
}

/// Refresh the package index.
pub fn update_index() -> Result<()> {
    let args = ["apt-get", "update"];
    debug_exec("sudo", &args);
    cmd("sudo", &args)
        .run()
        .context("Failed to refresh the apt package index")?;
    Ok(())
}

/// Install packages non-interactively.
pub fn install(packages: &[&str]) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }

    let (sudo, base_args) = INSTALL_COMMAND;
    let mut args: Vec<&str> = base_args.to_vec();
    args.extend(packages);
    debug_exec(sudo, &args);

    cmd(sudo, &args)
        .run()
        .context("Failed to install packages with apt")?;

    Ok(())
}

/// Whether the archive knows about a package, installed or not.
pub fn is_available(package: &str) -> bool {
    let args = ["show", package];
    debug_exec("apt-cache", &args);
    cmd("apt-cache", &args)
        .stdout_null()
        .stderr_null()
        .unchecked()
        .run()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Whether a package is currently installed.
pub fn is_installed(package: &str) -> bool {
    cmd!("dpkg-query", "-W", "-f=${Status}", package)
        .stderr_null()
        .unchecked()
        .read()
        .map(|status| status_is_installed(&status))
        .unwrap_or(false)
}

/// `dpkg-query` keeps removed-but-not-purged packages around with a
/// "deinstall" status, so exit code alone is not enough.
fn status_is_installed(status: &str) -> bool {
    status.trim() == "install ok installed"
}
