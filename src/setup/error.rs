use thiserror::Error;

/// Conditions that end the run with a non-zero exit code.
///
/// Anything not listed here is advisory and only shows up as a warning.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Do not run this as root; rootless setup must run as the user who will own the containers")]
    RunningAsRoot,
    #[error("Required command '{0}' was not found on PATH")]
    MissingCommand(String),
    #[error("Could not resolve a user name for uid {0}")]
    IdentityUnavailable(u32),
    #[error("Package installation failed")]
    PackageInstall(#[source] anyhow::Error),
}
