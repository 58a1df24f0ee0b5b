use super::Context;
use super::outcome::StepOutcome;
use crate::ui::prelude::*;

pub const STEP: &str = "Storage migration";

/// Migrate podman storage after new subordinate ranges were added.
///
/// Runs only when the mapping step changed something. A failed migration is
/// advisory: the new ranges apply per login session, so it often succeeds
/// after the user logs in again.
pub fn run(ctx: &Context, mapping_changed: bool) -> StepOutcome {
    if !mapping_changed {
        return StepOutcome::skipped(STEP, "subordinate ids unchanged");
    }

    if let Err(e) = ctx.host.stop_all_containers() {
        emit(
            Level::Debug,
            "migrate.stop",
            &format!("Stopping containers failed (probably none running): {e:#}"),
            None,
        );
    }

    let mut outcome = StepOutcome::new(STEP);
    match ctx.host.migrate_storage() {
        Ok(()) => {
            emit(Level::Success, "migrate.ok", "podman storage migrated.", None);
            outcome.with_detail("podman system migrate")
        }
        Err(e) => {
            outcome.warn(
                "migrate.failed",
                &format!("podman system migrate failed: {e:#}"),
                Some("Log out of WSL (`wsl --terminate <distro>`), log back in and run `podman system migrate`"),
            );
            outcome
        }
    }
}
