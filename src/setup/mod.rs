//! The setup pipeline.
//!
//! Steps run strictly in order, each in its own module. Steps share nothing
//! except the immutable [`Context`] and the mapping-changed flag handed from
//! [`idmap`] to [`migrate`].

pub mod deps;
pub mod error;
pub mod idmap;
pub mod migrate;
pub mod outcome;
pub mod preflight;
pub mod prompt;
pub mod shim;
pub mod socket;
pub mod verify;

#[cfg(test)]
pub mod fake;

use anyhow::Result;

use crate::common::{Host, Identity, SetupConfig};
use crate::ui::prelude::*;
use outcome::Summary;
use prompt::Prompt;

/// Flags resolved once from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub skip_socket: bool,
    pub skip_shim: bool,
    pub non_interactive: bool,
}

/// Everything a step may look at. Nothing in here changes during a run.
pub struct Context<'a> {
    pub host: &'a dyn Host,
    pub prompt: &'a dyn Prompt,
    pub config: &'a SetupConfig,
    pub identity: &'a Identity,
    pub options: RunOptions,
}

/// Run every step. Returns early only on a fatal error.
pub fn run(ctx: &Context) -> Result<Summary> {
    let mut summary = Summary::default();

    section("Preflight checks");
    summary.push(preflight::run(ctx)?);

    section("Installing dependencies");
    summary.push(deps::run(ctx)?);

    section("Configuring subordinate ids");
    let mapping = idmap::run(ctx)?;
    summary.push(mapping.outcome);

    section("Migrating podman storage");
    summary.push(migrate::run(ctx, mapping.changed));

    section("Verifying rootless podman");
    summary.push(verify::run(ctx));

    section("Docker-compatible socket");
    summary.push(socket::run(ctx)?);

    section("Docker CLI compatibility");
    summary.push(shim::run(ctx)?);

    Ok(summary)
}
