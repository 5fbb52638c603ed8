//! Raid lifecycle: progress accounting, end detection, and grace-delay
//! finalization.
//!
//! The raid winds down when either the attacker is spent (no
//! reinforcements, no live units, no spawns in flight) or every
//! opposing offensive/economy structure is down. A fixed grace delay
//! then lets in-flight shells and staggered spawns resolve before the
//! result is finalized.

use hecs::World;

use rampart_core::components::{Health, Structure, Unit};
use rampart_core::constants::{ENDING_GRACE_SECS, RAID_TIME_LIMIT_SECS};
use rampart_core::enums::{RaidPhase, StructureRole};
use rampart_core::events::BattleEvent;
use rampart_core::state::RaidResult;

use crate::raid::{destruction_pct, RaidObserver};
use crate::schedule::secs_to_ticks;
use crate::systems::effects::BattleCtx;

pub fn run(
    world: &mut World,
    ctx: &mut BattleCtx,
    observer: &mut Option<Box<dyn RaidObserver>>,
) {
    if matches!(ctx.raid.phase, RaidPhase::NotStarted | RaidPhase::Ended) {
        return;
    }

    let live_units = world
        .query::<(&Unit, &Health)>()
        .iter()
        .filter(|(_, (_, health))| health.is_alive())
        .count() as u32;
    let remaining = world
        .query::<(&Structure, &Health)>()
        .iter()
        .filter(|(_, (structure, health))| {
            health.is_alive()
                && matches!(
                    structure.role,
                    StructureRole::Offensive | StructureRole::Economy
                )
        })
        .count() as u32;

    let pct = destruction_pct(ctx.raid.initial_defenses, ctx.raid.destroyed, remaining);

    // Progress sink, fired only on change.
    if ctx.raid.last_progress != Some((pct, ctx.raid.loot)) {
        ctx.raid.last_progress = Some((pct, ctx.raid.loot));
        if let Some(observer) = observer.as_mut() {
            observer.on_progress(pct, ctx.raid.loot);
        }
        ctx.events.push(BattleEvent::Progress {
            destruction_pct: pct,
            loot: ctx.raid.loot,
        });
    }

    match ctx.raid.phase {
        RaidPhase::Deploying | RaidPhase::Active => {
            let army_spent = ctx.raid.reinforcements_remaining() == 0
                && live_units == 0
                && ctx.raid.pending_spawns == 0;
            let base_flattened = remaining == 0;
            let live = ctx.raid.phase == RaidPhase::Active;
            let timed_out = ctx.now >= secs_to_ticks(RAID_TIME_LIMIT_SECS);
            if (live && (army_spent || base_flattened)) || timed_out {
                ctx.raid.phase = RaidPhase::Ending;
                ctx.raid.ending_at_tick = Some(ctx.now + secs_to_ticks(ENDING_GRACE_SECS));
            }
        }
        RaidPhase::Ending => {
            let due = ctx.raid.ending_at_tick.unwrap_or(ctx.now);
            if ctx.now >= due {
                ctx.raid.phase = RaidPhase::Ended;
                ctx.raid.result = Some(RaidResult {
                    attacker_id: ctx.raid.attacker_id,
                    defender_id: ctx.raid.defender_id,
                    loot: ctx.raid.loot,
                    destruction_pct: pct,
                    raid_id: ctx.raid.raid_id,
                });
                let handled = observer
                    .as_mut()
                    .map(|o| o.on_raid_ended(ctx.raid.loot))
                    .unwrap_or(false);
                if !handled {
                    // Default resolution path.
                    ctx.events.push(BattleEvent::RaidEnded {
                        destruction_pct: pct,
                        loot: ctx.raid.loot,
                    });
                }
            }
        }
        _ => {}
    }
}
