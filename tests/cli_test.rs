mod utils;

use anyhow::Result;

#[test]
fn help_prints_usage_and_touches_nothing() -> Result<()> {
    let home = tempfile::tempdir()?;

    for flag in ["-h", "--help"] {
        let output = utils::run_setup_command(home.path(), &[flag])?;
        assert_eq!(output.exit_code, 0, "{flag} failed: {}", output.stderr);
        assert!(output.stdout.contains("--skip-socket"));
        assert!(output.stdout.contains("--skip-docker-shim"));
        assert!(output.stdout.contains("--non-interactive"));
    }

    let output = utils::run_setup_command(home.path(), &["--help"])?;
    assert!(output.stdout.contains("podman system migrate"));
    assert!(utils::dir_is_empty(home.path())?, "--help wrote into HOME");

    Ok(())
}

#[test]
fn unknown_flag_fails_with_error_on_stderr() -> Result<()> {
    let home = tempfile::tempdir()?;
    let output = utils::run_setup_command(home.path(), &["--assume-yes"])?;

    assert_ne!(output.exit_code, 0);
    assert!(output.stderr.contains("--assume-yes"));
    assert!(output.stdout.is_empty());
    assert!(utils::dir_is_empty(home.path())?);

    Ok(())
}

#[test]
fn invalid_output_format_is_rejected() -> Result<()> {
    let home = tempfile::tempdir()?;
    let output = utils::run_setup_command(home.path(), &["--output", "yaml"])?;
    assert_ne!(output.exit_code, 0);
    Ok(())
}

/// Any fatal error, including the superuser refusal, leaves `main` through the
/// same `[ERROR]` line and exit status 1. A missing config is the one fatal
/// condition reachable without root or a WSL guest.
#[test]
fn missing_explicit_config_is_fatal() -> Result<()> {
    let home = tempfile::tempdir()?;
    let missing = home.path().join("absent.toml");
    let output = utils::run_setup_command(
        home.path(),
        &["--config", missing.to_str().unwrap(), "--non-interactive"],
    )?;

    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("[ERROR]"));
    assert!(output.stderr.contains("absent.toml"));
    Ok(())
}
