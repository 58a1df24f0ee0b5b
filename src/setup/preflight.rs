//! Read-only inspection of the guest before anything is changed.
//!
//! Only the privilege check and the required-command check are fatal; every
//! other finding is an advisory.

use anyhow::Result;

use super::Context;
use super::error::SetupError;
use super::outcome::StepOutcome;
use crate::ui::prelude::*;

pub const STEP: &str = "Preflight";

/// Commands the pipeline cannot do without before podman itself is installed.
/// `systemctl` and `findmnt` are only probed, so their absence is a warning.
pub const REQUIRED_COMMANDS: &[&str] = &["sudo", "apt-get", "apt-cache", "dpkg-query", "usermod"];

const WSL_MARKER: &str = "microsoft";

pub fn run(ctx: &Context) -> Result<StepOutcome> {
    if ctx.identity.is_root() {
        return Err(SetupError::RunningAsRoot.into());
    }
    for command in REQUIRED_COMMANDS {
        if !ctx.host.has_command(command) {
            return Err(SetupError::MissingCommand(command.to_string()).into());
        }
    }

    let mut outcome = StepOutcome::new(STEP);
    check_wsl(ctx);
    check_systemd(ctx, &mut outcome);
    check_cgroups(ctx, &mut outcome);
    check_propagation(ctx, &mut outcome);

    if !outcome.is_warned() {
        outcome = outcome.with_detail("environment looks good");
    }
    Ok(outcome)
}

fn check_wsl(ctx: &Context) {
    let is_wsl = ctx
        .host
        .kernel_version()
        .is_some_and(|v| v.to_lowercase().contains(WSL_MARKER));
    if is_wsl {
        emit(Level::Info, "preflight.wsl", "Detected WSL kernel.", None);
    } else {
        emit(
            Level::Info,
            "preflight.not_wsl",
            "This does not look like WSL; continuing anyway.",
            None,
        );
    }
}

fn check_systemd(ctx: &Context, outcome: &mut StepOutcome) {
    let state = ctx.host.system_state();
    if state.is_usable() {
        emit(
            Level::Success,
            "preflight.systemd",
            &format!("systemd is {state}."),
            None,
        );
        return;
    }
    outcome.warn(
        "preflight.systemd",
        &format!("systemd is not running (state: {state}). User services and the podman socket need it."),
        Some("Enable systemd in /etc/wsl.conf ([boot] systemd=true), then run `wsl --shutdown` from Windows"),
    );
}

fn check_cgroups(ctx: &Context, outcome: &mut StepOutcome) {
    if ctx.host.has_cgroup_v2() {
        emit(Level::Success, "preflight.cgroup", "cgroup v2 is available.", None);
        return;
    }
    outcome.warn(
        "preflight.cgroup.v1",
        "cgroup v2 not detected; rootless podman works poorly on cgroup v1 (no resource limits).",
        Some("Add `kernelCommandLine = cgroup_no_v1=all` under [wsl2] in %UserProfile%\\.wslconfig and restart WSL"),
    );
}

fn check_propagation(ctx: &Context, outcome: &mut StepOutcome) {
    match ctx.host.root_propagation() {
        Some(mode) if mode == "shared" => {
            emit(
                Level::Success,
                "preflight.propagation",
                "Root filesystem propagation is shared.",
                None,
            );
        }
        other => {
            let mode = other.unwrap_or_else(|| "unknown".to_string());
            outcome.warn(
                "preflight.propagation",
                &format!("Root filesystem propagation is '{mode}', not 'shared'; podman will warn on every run."),
                Some("Run `sudo mount --make-rshared /` (add it to the [boot] command in /etc/wsl.conf to persist)"),
            );
        }
    }
}
