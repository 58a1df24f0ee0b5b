use anyhow::Result;

use super::Context;
use super::error::SetupError;
use super::outcome::StepOutcome;
use crate::common::host::ENGINE;
use crate::ui::prelude::*;

pub const STEP: &str = "Dependencies";

/// Packages to install and whether the archive offers the modern network sandbox.
#[derive(Debug, PartialEq, Eq)]
pub struct PackageSet {
    pub packages: Vec<String>,
    pub modern_network: bool,
}

/// Base packages plus the modern network sandbox when the archive has it.
pub fn package_set(ctx: &Context) -> PackageSet {
    let mut packages = ctx.config.base_packages.clone();
    let network = &ctx.config.network_package;
    let modern_network = ctx.host.package_available(network);
    if modern_network && !packages.contains(network) {
        packages.push(network.clone());
    }
    PackageSet {
        packages,
        modern_network,
    }
}

pub fn run(ctx: &Context) -> Result<StepOutcome> {
    let mut outcome = StepOutcome::new(STEP);
    let PackageSet {
        packages,
        modern_network,
    } = package_set(ctx);
    let network = &ctx.config.network_package;
    if modern_network {
        emit(
            Level::Info,
            "deps.network.modern",
            &format!("{network} is available and will be used for rootless networking."),
            None,
        );
    } else {
        outcome.warn(
            "deps.network.fallback",
            &format!(
                "{network} is not available; rootless networking uses the older sandbox from the base packages."
            ),
            None,
        );
    }

    let names: Vec<&str> = packages.iter().map(String::as_str).collect();

    emit(
        Level::Info,
        "deps.install",
        &format!("Installing: {}", names.join(" ")),
        Some(serde_json::json!({ "packages": names })),
    );

    ctx.host
        .refresh_packages()
        .and_then(|()| ctx.host.install_packages(&names))
        .map_err(SetupError::PackageInstall)?;

    if !ctx.host.has_command(ENGINE) {
        return Err(SetupError::MissingCommand(ENGINE.to_string()).into());
    }

    if !outcome.is_warned() {
        outcome = outcome.with_detail(format!("installed {} packages", names.len()));
    }
    Ok(outcome)
}
