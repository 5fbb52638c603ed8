//! Structure weapon scheduling.
//!
//! Runs before unit attacks every tick. Each live turret gates on its
//! cooldown, picks the nearest victim inside its firing band, and
//! dispatches by attack style. Wind-up weapons run a small phase
//! machine and honor their lock even when the victim dies mid-charge.

use hecs::{Entity, World};

use rampart_core::components::*;
use rampart_core::enums::*;
use rampart_core::stats::{self, AttackStyle, StructureStats};
use rampart_core::types::Position;

use rampart_grid::targeting::{self, UnitCandidate};

use crate::schedule::{flight_ticks, secs_to_ticks, ImpactSpec, Pending};
use crate::systems::effects::{self, BattleCtx};

pub fn run(world: &mut World, ctx: &mut BattleCtx) {
    // Live attacker units, snapshotted once for the whole pass.
    let mut units: Vec<(u32, Entity, Position)> = world
        .query::<(&Ident, &Unit, &Position, &Health)>()
        .iter()
        .filter(|(_, (_, _, _, health))| health.is_alive())
        .map(|(entity, (ident, _, pos, _))| (ident.id, entity, *pos))
        .collect();
    units.sort_by_key(|(id, _, _)| *id);
    let candidates: Vec<UnitCandidate> = units
        .iter()
        .map(|(id, _, pos)| UnitCandidate {
            id: *id,
            position: *pos,
        })
        .collect();

    // Work list of live turrets.
    let mut turrets: Vec<(u32, Entity, Structure)> = world
        .query::<(&Ident, &Structure, &Turret, &Health)>()
        .iter()
        .filter(|(_, (_, _, _, health))| health.is_alive())
        .map(|(entity, (ident, structure, _, _))| (ident.id, entity, *structure))
        .collect();
    turrets.sort_by_key(|(id, _, _)| *id);

    for (_, entity, structure) in turrets {
        let s = stats::structure_stats(structure.kind, structure.level);
        let style = match s.style {
            Some(style) => style,
            None => continue,
        };
        let center = structure.footprint.center();
        match style {
            AttackStyle::ChargeUp { charge_secs } => {
                run_charge(world, ctx, entity, center, &s, charge_secs, &units, &candidates);
            }
            _ => run_direct(world, ctx, entity, center, &s, style, &units, &candidates),
        }
    }
}

fn cooldown_open(turret: &Turret, interval_secs: f32, now: u64) -> bool {
    match turret.last_fire_tick {
        None => true,
        Some(last) => now >= last + secs_to_ticks(interval_secs),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_direct(
    world: &mut World,
    ctx: &mut BattleCtx,
    entity: Entity,
    center: Position,
    s: &StructureStats,
    style: AttackStyle,
    units: &[(u32, Entity, Position)],
    candidates: &[UnitCandidate],
) {
    let turret = match world.get::<&Turret>(entity) {
        Ok(turret) => *turret,
        Err(_) => return,
    };
    if !cooldown_open(&turret, s.fire_interval_secs, ctx.now) {
        return;
    }

    let target_id = match targeting::find_unit_target(center, s.range, s.dead_zone, candidates) {
        Some(id) => id,
        None => return,
    };
    let target_pos = match units.iter().find(|(id, _, _)| *id == target_id) {
        Some((_, _, pos)) => *pos,
        None => return,
    };

    // Train the barrel and open fire.
    if let Ok(mut t) = world.get::<&mut Turret>(entity) {
        t.facing = facing_toward(center, target_pos);
        t.last_fire_tick = Some(ctx.now);
    }

    match style {
        AttackStyle::Projectile { speed } => {
            let due = ctx.now + flight_ticks(center.range_to(&target_pos), speed);
            ctx.schedule.push_at(
                due,
                Pending::Impact(ImpactSpec {
                    owner: Owner::Defender,
                    target: Some(target_id),
                    position: target_pos,
                    damage: s.damage,
                    splash_radius: None,
                    fortification_multiplier: 1.0,
                    zone: None,
                }),
            );
        }
        AttackStyle::Splash { speed, radius } => {
            // The shell lands where the victim stood at fire time.
            let due = ctx.now + flight_ticks(center.range_to(&target_pos), speed);
            ctx.schedule.push_at(
                due,
                Pending::Impact(ImpactSpec {
                    owner: Owner::Defender,
                    target: None,
                    position: target_pos,
                    damage: s.damage,
                    splash_radius: Some(radius),
                    fortification_multiplier: 1.0,
                    zone: None,
                }),
            );
        }
        AttackStyle::Chain { hops, hop_range } => {
            effects::resolve_chain(world, ctx, target_id, s.damage, hops, hop_range);
        }
        AttackStyle::AreaDenial { speed, zone } => {
            let due = ctx.now + flight_ticks(center.range_to(&target_pos), speed);
            ctx.schedule.push_at(
                due,
                Pending::Impact(ImpactSpec {
                    owner: Owner::Defender,
                    target: None,
                    position: target_pos,
                    damage: 0.0,
                    splash_radius: None,
                    fortification_multiplier: 1.0,
                    zone: Some(zone),
                }),
            );
        }
        // Melee, SelfDestruct, and ChargeUp never appear on turrets.
        _ => {}
    }
}

/// Wind-up phase machine: Idle -> Charging (lock acquired) -> fire on
/// completion -> Cooldown -> Idle. The lock is not re-targeted
/// mid-charge; a dead lock wastes the shot.
#[allow(clippy::too_many_arguments)]
fn run_charge(
    world: &mut World,
    ctx: &mut BattleCtx,
    entity: Entity,
    center: Position,
    s: &StructureStats,
    charge_secs: f32,
    units: &[(u32, Entity, Position)],
    candidates: &[UnitCandidate],
) {
    let turret = match world.get::<&Turret>(entity) {
        Ok(turret) => *turret,
        Err(_) => return,
    };

    match turret.charge {
        ChargePhase::Idle => {
            if !cooldown_open(&turret, s.fire_interval_secs, ctx.now) {
                return;
            }
            let target_id =
                match targeting::find_unit_target(center, s.range, s.dead_zone, candidates) {
                    Some(id) => id,
                    None => return,
                };
            let target_pos = match units.iter().find(|(id, _, _)| *id == target_id) {
                Some((_, _, pos)) => *pos,
                None => return,
            };
            if let Ok(mut t) = world.get::<&mut Turret>(entity) {
                t.charge = ChargePhase::Charging;
                t.charge_started_tick = ctx.now;
                t.locked_target = Some(target_id);
                t.facing = facing_toward(center, target_pos);
            }
        }
        ChargePhase::Charging => {
            if ctx.now < turret.charge_started_tick + secs_to_ticks(charge_secs) {
                return;
            }
            // Wind-up complete: fire at the lock, which may be long gone.
            let victim = turret.locked_target.and_then(|id| {
                units
                    .iter()
                    .find(|(uid, _, _)| *uid == id)
                    .map(|(_, entity, _)| *entity)
            });
            if let Ok(mut t) = world.get::<&mut Turret>(entity) {
                t.charge = ChargePhase::Cooldown;
                t.last_fire_tick = Some(ctx.now);
                t.locked_target = None;
            }
            if let Some(victim) = victim {
                effects::apply_damage(world, ctx, victim, s.damage);
            }
        }
        ChargePhase::Cooldown => {
            if cooldown_open(&turret, s.fire_interval_secs, ctx.now) {
                if let Ok(mut t) = world.get::<&mut Turret>(entity) {
                    t.charge = ChargePhase::Idle;
                }
            }
        }
    }
}

fn facing_toward(from: Position, to: Position) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}
