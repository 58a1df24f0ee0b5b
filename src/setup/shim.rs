use anyhow::Result;

use super::Context;
use super::error::SetupError;
use super::outcome::StepOutcome;
use super::prompt::{Gate, resolve_gate};
use crate::ui::prelude::*;

pub const STEP: &str = "Docker CLI shim";

pub fn run(ctx: &Context) -> Result<StepOutcome> {
    let package = ctx.config.shim_package.as_str();
    let gate = resolve_gate(
        ctx.options.skip_shim,
        ctx.options.non_interactive,
        ctx.prompt,
        &format!("Install the `docker` command shim ({package})?"),
    )?;
    if gate == Gate::Disabled {
        return Ok(StepOutcome::skipped(STEP, "not requested"));
    }

    if ctx.host.package_installed(package) {
        emit(
            Level::Info,
            "shim.present",
            &format!("{package} is already installed."),
            None,
        );
    } else {
        emit(Level::Info, "shim.install", &format!("Installing {package}"), None);
        ctx.host
            .install_packages(&[package])
            .map_err(SetupError::PackageInstall)?;
    }

    let mut outcome = StepOutcome::new(STEP);
    let Some(shim) = ctx.host.find_shim() else {
        outcome.warn(
            "shim.missing",
            "The docker command is not on PATH yet.",
            Some("Open a new shell (or run `hash -r`) so the docker shim is picked up"),
        );
        return Ok(outcome);
    };

    match ctx.host.shim_info(&shim) {
        Ok(()) => {
            emit(
                Level::Success,
                "shim.ok",
                &format!("{} info works through podman.", shim.display()),
                None,
            );
            Ok(outcome.with_detail(shim.display().to_string()))
        }
        Err(e) => {
            outcome.warn(
                "shim.info_failed",
                &format!("{} info failed: {e:#}", shim.display()),
                Some("The docker shim may need the podman socket; rerun without --skip-socket or open a new shell"),
            );
            Ok(outcome)
        }
    }
}
