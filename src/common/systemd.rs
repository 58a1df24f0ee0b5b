use anyhow::{Context, Result};
use duct::cmd;

use super::shell::command_line;
use crate::ui::prelude::*;

/// Represents the scope of a systemd unit (system or user)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceScope {
    System,
    User,
}

impl ServiceScope {
    /// Get the systemctl command arguments for this scope
    pub fn systemctl_args(&self) -> Vec<&'static str> {
        match self {
            ServiceScope::System => vec![],
            ServiceScope::User => vec!["--user"],
        }
    }
}

/// Overall state reported by `systemctl is-system-running`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemState {
    Running,
    Degraded,
    Other(String),
    /// systemctl missing or produced no output
    Unavailable,
}

impl SystemState {
    pub fn parse(output: &str) -> Self {
        match output.trim() {
            "" => SystemState::Unavailable,
            "running" => SystemState::Running,
            "degraded" => SystemState::Degraded,
            other => SystemState::Other(other.to_string()),
        }
    }

    /// Rootless podman needs a working user session, which both states provide.
    pub fn is_usable(&self) -> bool {
        matches!(self, SystemState::Running | SystemState::Degraded)
    }
}

impl std::fmt::Display for SystemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemState::Running => write!(f, "running"),
            SystemState::Degraded => write!(f, "degraded"),
            SystemState::Other(s) => write!(f, "{s}"),
            SystemState::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Systemd manager for the few operations the setup needs
pub struct SystemdManager {
    scope: ServiceScope,
}

impl SystemdManager {
    /// Create a new systemd manager for the given scope
    pub fn new(scope: ServiceScope) -> Self {
        Self { scope }
    }

    /// Create a systemd manager for system services
    pub fn system() -> Self {
        Self::new(ServiceScope::System)
    }

    /// Create a systemd manager for user services
    pub fn user() -> Self {
        Self::new(ServiceScope::User)
    }

    /// Query the overall run state of the service manager.
    ///
    /// `is-system-running` exits non-zero for anything but "running", so the
    /// exit status is ignored and only the printed state counts.
    pub fn system_state(&self) -> SystemState {
        let mut args = self.scope.systemctl_args();
        args.push("is-system-running");
        emit(Level::Debug, "systemd.exec", &command_line("systemctl", &args), None);

        cmd("systemctl", &args)
            .unchecked()
            .stderr_null()
            .read()
            .map(|out| SystemState::parse(&out))
            .unwrap_or(SystemState::Unavailable)
    }

    /// Check if a unit is currently active
    pub fn is_active(&self, unit: &str) -> bool {
        let mut args = self.scope.systemctl_args();
        args.extend(["is-active", "--quiet", unit]);
        cmd("systemctl", &args)
            .unchecked()
            .run()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    /// Enable and start a unit
    pub fn enable_and_start(&self, unit: &str) -> Result<()> {
        let mut args = self.scope.systemctl_args();
        args.extend(["enable", "--now", unit]);
        emit(Level::Debug, "systemd.exec", &command_line("systemctl", &args), None);

        cmd("systemctl", &args)
            .run()
            .with_context(|| format!("Failed to enable and start '{}'", unit))?;
        Ok(())
    }
}
