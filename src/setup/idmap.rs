use anyhow::Result;

use super::Context;
use super::outcome::StepOutcome;
use crate::common::subid::{self, Allocation, SubidEntry};
use crate::ui::prelude::*;

pub const STEP: &str = "Subordinate IDs";

/// Result of the identity mapping step. `changed` is the only value any later
/// step reads from an earlier one.
#[derive(Debug)]
pub struct IdMapResult {
    pub outcome: StepOutcome,
    pub changed: bool,
}

pub fn run(ctx: &Context) -> Result<IdMapResult> {
    let user = ctx.identity.name.as_str();
    let has_uids = subid::has_entry(&subid::read(&ctx.config.subuid_path)?, user);
    let has_gids = subid::has_entry(&subid::read(&ctx.config.subgid_path)?, user);

    let changed = if has_uids && has_gids {
        emit(
            Level::Info,
            "idmap.present",
            &format!("{user} already has subordinate uid and gid ranges."),
            None,
        );
        false
    } else {
        let allocation = Allocation {
            first: ctx.config.subid_base,
            last: ctx.config.subid_end(),
            uids: !has_uids,
            gids: !has_gids,
        };
        emit(
            Level::Info,
            "idmap.allocate",
            &format!(
                "Allocating subordinate ids {}-{} for {user}",
                allocation.first, allocation.last
            ),
            None,
        );
        ctx.host.add_subordinate_ids(user, allocation)?;
        true
    };

    show_entries(ctx);

    let detail = if changed {
        format!(
            "allocated {} ids from {}",
            ctx.config.subid_count, ctx.config.subid_base
        )
    } else {
        "already configured".to_string()
    };
    Ok(IdMapResult {
        outcome: StepOutcome::new(STEP).with_detail(detail),
        changed,
    })
}

/// Echo the user's mapping lines so the operator can confirm them.
fn show_entries(ctx: &Context) {
    let user = ctx.identity.name.as_str();
    for (label, path) in [
        ("subuid", &ctx.config.subuid_path),
        ("subgid", &ctx.config.subgid_path),
    ] {
        let Ok(contents) = subid::read(path) else {
            continue;
        };
        for line in subid::lines_for(&contents, user) {
            let data = SubidEntry::parse(line).map(|e| {
                serde_json::json!({
                    "file": label,
                    "owner": e.owner,
                    "start": e.start,
                    "count": e.count,
                })
            });
            emit(Level::Info, "idmap.entry", &format!("{label}: {line}"), data);
        }
    }
}
