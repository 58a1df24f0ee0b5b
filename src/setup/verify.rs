use super::Context;
use super::outcome::StepOutcome;
use crate::ui::prelude::*;

pub const STEP: &str = "Rootless check";

/// Confirm podman runs rootless and can actually start a container.
///
/// Both checks are advisory. If `podman info` cannot run at all there is
/// nothing meaningful left to test, so the canary is not attempted.
pub fn run(ctx: &Context) -> StepOutcome {
    let mut outcome = StepOutcome::new(STEP);

    let rootless = match ctx.host.rootless_status() {
        Ok(value) => value,
        Err(e) => {
            outcome.warn(
                "verify.info_failed",
                &format!("podman info failed: {e:#}"),
                Some("Run `podman info` manually to see why podman cannot start"),
            );
            return outcome;
        }
    };

    match rootless.as_str() {
        "true" => emit(Level::Success, "verify.rootless", "podman is running rootless.", None),
        "" => outcome.warn(
            "verify.rootless_missing",
            "podman info did not report a rootless field.",
            Some("Check the podman version with `podman --version`; rootless support needs podman 3 or newer"),
        ),
        other => outcome.warn(
            "verify.rootless_mismatch",
            &format!("podman reports rootless={other}, expected true."),
            Some("Make sure you are not running podman through sudo and that XDG_RUNTIME_DIR points at /run/user/<uid>"),
        ),
    }

    let image = &ctx.config.canary_image;
    match ctx.host.run_canary(image) {
        Ok(()) => emit(
            Level::Success,
            "verify.canary",
            &format!("Canary container {image} ran successfully."),
            None,
        ),
        Err(e) => outcome.warn(
            "verify.canary_failed",
            &format!("Canary container {image} failed ({e:#}); networking or storage is probably misconfigured."),
            Some(&format!(
                "Check `podman info` for the network backend and graph driver, then retry `podman run --rm {image}`"
            )),
        ),
    }

    if !outcome.is_warned() {
        outcome = outcome.with_detail("rootless, canary ok");
    }
    outcome
}
