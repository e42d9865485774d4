use crate::action::{ActionPlan, Destination};
use crate::config::ActionSettings;
use crate::env::{Env, WorldError};
use crate::error::ActionError;
use crate::state::{Location, Tick};

use super::CooldownLedger;

/// Blocks probed below a destination when looking for safe ground.
pub const SAFE_GROUND_SEARCH_DEPTH: u32 = 12;

/// Performs the teleport described by `plan` and arms the requester's
/// cooldown on success.
///
/// Player destinations are re-read here, not at warmup start. Nothing is
/// armed when any step fails.
pub fn execute(
    plan: &ActionPlan,
    settings: &ActionSettings,
    now: Tick,
    ledger: &mut CooldownLedger,
    env: Env<'_>,
) -> Result<Location, ActionError> {
    let players = env.players();
    let world = env.world();

    if !players.is_online(plan.mover) {
        return Err(failed(WorldError::PlayerGone(plan.mover)));
    }

    let mut target = match plan.destination {
        Destination::Fixed(location) => location,
        Destination::Player(id) => {
            let position = players
                .position(id)
                .ok_or_else(|| failed(WorldError::PlayerGone(id)))?;
            Location {
                position,
                orientation: players.orientation(id),
            }
        }
    };

    if settings.safe_teleport {
        if let Some(ground) = world.find_safe_ground(target.position, SAFE_GROUND_SEARCH_DEPTH) {
            target.position = ground;
        }
    }

    world.load_region(target.position).map_err(failed)?;
    world.teleport(plan.mover, &target).map_err(failed)?;

    if !plan.exempt {
        ledger.arm(plan.requester, plan.kind, now, settings.cooldown_ticks);
    }
    Ok(target)
}

fn failed(err: WorldError) -> ActionError {
    tracing::warn!(error = %err, "teleport failed");
    ActionError::ExecutionFailed(err.to_string())
}
