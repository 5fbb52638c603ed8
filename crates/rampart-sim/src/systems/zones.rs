//! Zone ticking and expiry.
//!
//! Zones tick on their own interval, independent of the frame cadence.
//! The tick check runs before the expiry check, so a final tick landing
//! inside the last interval still fires.

use hecs::{Entity, World};

use rampart_core::components::{Health, Ident, Unit, Zone};
use rampart_core::types::Position;

use crate::systems::effects::{self, BattleCtx};

pub fn run(world: &mut World, ctx: &mut BattleCtx) {
    let zones: Vec<(Entity, Zone, Position)> = world
        .query::<(&Zone, &Position)>()
        .iter()
        .map(|(entity, (zone, pos))| (entity, *zone, *pos))
        .collect();

    for (entity, zone, center) in zones {
        if ctx.now >= zone.next_tick_at {
            let mut victims: Vec<(u32, Entity)> = world
                .query::<(&Ident, &Unit, &Position, &Health)>()
                .iter()
                .filter(|(_, (ident, _, pos, health))| {
                    ident.owner != zone.owner
                        && health.is_alive()
                        && pos.range_to(&center) <= zone.radius
                })
                .map(|(victim, (ident, _, _, _))| (ident.id, victim))
                .collect();
            victims.sort_by_key(|(id, _)| *id);
            for (_, victim) in victims {
                effects::apply_damage(world, ctx, victim, zone.damage_per_tick);
            }
            if let Ok(mut z) = world.get::<&mut Zone>(entity) {
                z.next_tick_at += z.interval_ticks;
            }
        }

        if ctx.now >= zone.expires_at_tick {
            ctx.despawn.push(entity);
        }
    }
}
