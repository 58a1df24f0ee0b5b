mod common;
mod setup;
mod ui;

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::common::{Identity, SetupConfig, SystemHost};
use crate::setup::prompt::TerminalPrompt;
use crate::setup::{Context, RunOptions};
use crate::ui::prelude::*;

const LONG_ABOUT: &str = "\
Prepare a WSL2 Ubuntu guest for rootless Podman.

Steps, in order:
  1. Preflight checks: refuses to run as root; warns about missing systemd,
     cgroup v1 and non-shared mount propagation.
  2. Installs podman, uidmap, dbus-user-session, fuse-overlayfs, slirp4netns
     (and passt when available) with apt.
  3. Adds subordinate uid/gid ranges (100000-165535) for the current user if
     /etc/subuid or /etc/subgid lacks them.
  4. Runs `podman system migrate` when step 3 changed anything.
  5. Checks that podman runs rootless and can start a canary container.
  6. Optionally enables the user podman.socket and exports DOCKER_HOST in
     ~/.bashrc.
  7. Optionally installs podman-docker so `docker` commands go to podman.

Every step checks before it changes anything, so the tool is safe to rerun.
Settings can be overridden in ~/.config/podman-wsl-setup/config.toml.";

/// Rootless Podman setup for WSL2
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = LONG_ABOUT)]
struct Cli {
    /// Do not enable the Docker-compatible podman socket
    #[arg(long)]
    skip_socket: bool,

    /// Do not install the podman-docker shim
    #[arg(long)]
    skip_docker_shim: bool,

    /// Never prompt; optional steps run unless skipped
    #[arg(long)]
    non_interactive: bool,

    /// Config file (defaults to ~/.config/podman-wsl-setup/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Print every external command before running it
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn options(&self) -> RunOptions {
        RunOptions {
            skip_socket: self.skip_socket,
            skip_shim: self.skip_docker_shim,
            non_interactive: self.non_interactive,
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = SetupConfig::load(cli.config.as_deref())?;
    let identity = Identity::current()?;
    emit(
        Level::Debug,
        "identity",
        &format!("Running as {} (uid {})", identity.name, identity.uid),
        None,
    );

    let host = SystemHost;
    let ctx = Context {
        host: &host,
        prompt: &TerminalPrompt,
        config: &config,
        identity: &identity,
        options: cli.options(),
    };

    let summary = setup::run(&ctx)?;
    summary.print();
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let color = !cli.no_color && std::io::stdout().is_terminal();
    if !color {
        colored::control::set_override(false);
    }
    ui::init(cli.output, color);
    ui::set_debug_mode(cli.debug);

    if let Err(e) = run(&cli) {
        emit(Level::Error, "fatal", &format!("{e:#}"), None);
        std::process::exit(1);
    }
}
