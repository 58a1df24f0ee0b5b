use anyhow::{Context as _, Result};

use super::Context;
use super::outcome::StepOutcome;
use super::prompt::{Gate, resolve_gate};
use crate::common::profile;
use crate::ui::prelude::*;

pub const STEP: &str = "Docker socket";
pub const DOCKER_HOST: &str = "DOCKER_HOST";

/// Line persisted to the profile. `$(id -u)` is left for the shell to expand
/// so the line stays correct in every future session.
pub const PROFILE_EXPORT: &str =
    "export DOCKER_HOST=unix:///run/user/$(id -u)/podman/podman.sock";

pub fn socket_url(uid: u32) -> String {
    format!("unix:///run/user/{uid}/podman/podman.sock")
}

pub fn run(ctx: &Context) -> Result<StepOutcome> {
    let gate = resolve_gate(
        ctx.options.skip_socket,
        ctx.options.non_interactive,
        ctx.prompt,
        "Enable the Docker-compatible podman socket?",
    )?;
    if gate == Gate::Disabled {
        return Ok(StepOutcome::skipped(STEP, "not requested"));
    }

    let mut outcome = StepOutcome::new(STEP);
    let unit = &ctx.config.socket_unit;
    match ctx.host.enable_user_socket(unit) {
        Ok(()) => emit(
            Level::Success,
            "socket.enabled",
            &format!("{unit} is listening."),
            None,
        ),
        Err(e) => outcome.warn(
            "socket.failed",
            &format!("Could not start {unit}: {e:#}"),
            Some("Check `systemctl --user status podman.socket`; a user systemd session is required"),
        ),
    }

    let profile_path = ctx.config.profile_path();
    let appended = profile::append_line_once(&profile_path, PROFILE_EXPORT)
        .with_context(|| format!("updating {}", profile_path.display()))?;
    if appended {
        emit(
            Level::Info,
            "socket.profile",
            &format!("Added DOCKER_HOST export to {}", profile_path.display()),
            None,
        );
    } else {
        emit(
            Level::Debug,
            "socket.profile.present",
            &format!("{} already exports DOCKER_HOST", profile_path.display()),
            None,
        );
    }

    let url = socket_url(ctx.identity.uid);
    ctx.host.export_env(DOCKER_HOST, &url);

    if !outcome.is_warned() {
        outcome = outcome.with_detail(format!("DOCKER_HOST={url}"));
    }
    Ok(outcome)
}
