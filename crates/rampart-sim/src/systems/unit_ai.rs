//! Per-unit decisions: validate or re-acquire targets, plan paths,
//! coordinate break-ins, and attack when in range.
//!
//! A unit whose corridor is blocked by a structure it isn't targeting
//! attacks the obstacle instead of stalling — converging on the wall
//! its nearby allies are already hitting, so damage concentrates on one
//! break-in point rather than spreading across the perimeter.

use hecs::{Entity, World};

use rampart_core::components::*;
use rampart_core::constants::{BREAKIN_RADIUS, REPATH_INTERVAL_SECS};
use rampart_core::enums::*;
use rampart_core::stats::{self, AttackStyle, UnitStats};
use rampart_core::types::{Footprint, Position};

use rampart_grid::pathing::{self, Blocker};
use rampart_grid::targeting::{self, StructureCandidate};

use crate::schedule::{flight_ticks, secs_to_ticks, ImpactSpec, Pending};
use crate::systems::effects::{self, BattleCtx};

#[derive(Debug, Clone, Copy)]
struct StructSnap {
    id: u32,
    entity: Entity,
    kind: StructureKind,
    role: StructureRole,
    footprint: Footprint,
}

pub fn run(world: &mut World, ctx: &mut BattleCtx) {
    // One snapshot of the defender's live structures for the whole pass.
    let mut structures: Vec<StructSnap> = world
        .query::<(&Ident, &Structure, &Health)>()
        .iter()
        .filter(|(_, (_, _, health))| health.is_alive())
        .map(|(entity, (ident, structure, _))| StructSnap {
            id: ident.id,
            entity,
            kind: structure.kind,
            role: structure.role,
            footprint: structure.footprint,
        })
        .collect();
    structures.sort_by_key(|s| s.id);

    let candidates: Vec<StructureCandidate> = structures
        .iter()
        .map(|s| StructureCandidate {
            id: s.id,
            kind: s.kind,
            role: s.role,
            footprint: s.footprint,
        })
        .collect();
    let blockers: Vec<Blocker> = structures
        .iter()
        .map(|s| Blocker {
            id: s.id,
            footprint: s.footprint,
        })
        .collect();

    // Ally commitments, for break-in coordination.
    let allies: Vec<(u32, Position, Option<u32>)> = world
        .query::<(&Ident, &Unit, &Position, &Combatant, &Health)>()
        .iter()
        .filter(|(_, (_, _, _, _, health))| health.is_alive())
        .map(|(_, (ident, _, pos, combatant, _))| (ident.id, *pos, combatant.target))
        .collect();

    let mut work: Vec<(Entity, u32, Unit, Position, Combatant)> = world
        .query::<(&Ident, &Unit, &Position, &Combatant, &Health)>()
        .iter()
        .filter(|(_, (_, _, _, _, health))| health.is_alive())
        .map(|(entity, (ident, unit, pos, combatant, _))| {
            (entity, ident.id, *unit, *pos, *combatant)
        })
        .collect();
    work.sort_by_key(|(_, id, _, _, _)| *id);

    for (entity, id, unit, pos, combatant) in work {
        let s = stats::unit_stats(unit.kind, unit.level);

        // Validate the cached target; a dangling id means re-acquire.
        let mut target = combatant
            .target
            .and_then(|tid| structures.iter().find(|s| s.id == tid).copied());
        if target.is_none() {
            target = targeting::find_structure_target(pos, s.prefers_fortifications, &candidates)
                .and_then(|tid| structures.iter().find(|s| s.id == tid).copied());
        }
        let mut tgt = match target {
            Some(tgt) => tgt,
            None => {
                // Nothing left worth hitting; the lifecycle will notice.
                set_target(world, entity, None);
                continue;
            }
        };

        let dist = tgt.footprint.distance_to(&pos);
        if dist <= s.range {
            // Stand and fight. Inside the dead zone the unit holds
            // position at range without firing or oscillating.
            if let Ok(mut mover) = world.get::<&mut Mover>(entity) {
                mover.clear();
            }
            set_target(world, entity, Some(tgt.id));
            if dist >= s.dead_zone && ctx.now >= combatant.cooldown_until_tick {
                attack(world, ctx, entity, pos, &s, &tgt);
                if let Ok(mut c) = world.get::<&mut Combatant>(entity) {
                    c.cooldown_until_tick = ctx.now + secs_to_ticks(s.fire_interval_secs);
                }
            }
            continue;
        }

        // March. Replan when the cache is empty or past its deadline.
        let (has_path, stale) = match world.get::<&Mover>(entity) {
            Ok(mover) => (mover.has_path(), ctx.now >= mover.repath_at_tick),
            Err(_) => (false, true),
        };
        if has_path && !stale {
            continue;
        }

        // Head for the footprint center; the range check above stops
        // the unit well before it walks inside.
        let goal = tgt.footprint.center();
        let mut plan = pathing::plan_path(pos, goal, Some(tgt.id), &blockers);
        if let Some(obstacle_id) = plan.blocked_by {
            if let Some(chosen) = breakin_target(obstacle_id, &structures, &allies, id, pos) {
                tgt = chosen;
                plan = pathing::plan_path(
                    pos,
                    chosen.footprint.center(),
                    Some(chosen.id),
                    &blockers,
                );
            }
        }

        set_target(world, entity, Some(tgt.id));
        if let Ok(mut mover) = world.get::<&mut Mover>(entity) {
            mover.waypoints = plan.waypoints;
            mover.next_waypoint = 0;
            mover.repath_at_tick = ctx.now + secs_to_ticks(REPATH_INTERVAL_SECS);
        }
    }
}

fn set_target(world: &mut World, entity: Entity, target: Option<u32>) {
    if let Ok(mut combatant) = world.get::<&mut Combatant>(entity) {
        combatant.target = target;
    }
}

/// Pick the break-in point: the nearby wall the most nearby allies are
/// already committed to, otherwise the obstacle itself.
fn breakin_target(
    obstacle_id: u32,
    structures: &[StructSnap],
    allies: &[(u32, Position, Option<u32>)],
    self_id: u32,
    pos: Position,
) -> Option<StructSnap> {
    let obstacle = structures.iter().find(|s| s.id == obstacle_id).copied()?;
    if obstacle.kind != StructureKind::Wall {
        return Some(obstacle);
    }
    let obstacle_center = obstacle.footprint.center();

    let mut best: Option<(usize, u32)> = None;
    for wall in structures.iter().filter(|s| s.kind == StructureKind::Wall) {
        if wall.footprint.center().range_to(&obstacle_center) > BREAKIN_RADIUS {
            continue;
        }
        let committed = allies
            .iter()
            .filter(|(aid, apos, atarget)| {
                *aid != self_id
                    && *atarget == Some(wall.id)
                    && apos.range_to(&pos) <= BREAKIN_RADIUS
            })
            .count();
        if committed == 0 {
            continue;
        }
        let better = match best {
            None => true,
            Some((bc, bid)) => committed > bc || (committed == bc && wall.id < bid),
        };
        if better {
            best = Some((committed, wall.id));
        }
    }

    match best {
        Some((_, wall_id)) => structures.iter().find(|s| s.id == wall_id).copied(),
        None => Some(obstacle),
    }
}

fn attack(
    world: &mut World,
    ctx: &mut BattleCtx,
    entity: Entity,
    pos: Position,
    s: &UnitStats,
    tgt: &StructSnap,
) {
    let wall_mult = if tgt.kind == StructureKind::Wall {
        s.fortification_multiplier
    } else {
        1.0
    };

    match s.style {
        AttackStyle::Melee => {
            effects::apply_damage(world, ctx, tgt.entity, s.damage * wall_mult);
        }
        AttackStyle::Projectile { speed } => {
            let aim = tgt.footprint.closest_point(&pos);
            let due = ctx.now + flight_ticks(pos.range_to(&aim), speed);
            ctx.schedule.push_at(
                due,
                Pending::Impact(ImpactSpec {
                    owner: Owner::Attacker,
                    target: Some(tgt.id),
                    position: aim,
                    damage: s.damage,
                    splash_radius: None,
                    fortification_multiplier: s.fortification_multiplier,
                    zone: None,
                }),
            );
        }
        AttackStyle::Splash { speed, radius } => {
            let aim = tgt.footprint.center();
            let due = ctx.now + flight_ticks(pos.range_to(&aim), speed);
            ctx.schedule.push_at(
                due,
                Pending::Impact(ImpactSpec {
                    owner: Owner::Attacker,
                    target: None,
                    position: aim,
                    damage: s.damage,
                    splash_radius: Some(radius),
                    fortification_multiplier: s.fortification_multiplier,
                    zone: None,
                }),
            );
        }
        AttackStyle::SelfDestruct { radius } => {
            effects::resolve_splash(
                world,
                ctx,
                Owner::Attacker,
                pos,
                radius,
                s.damage,
                s.fortification_multiplier,
            );
            effects::kill(world, ctx, entity);
        }
        // Chain, ChargeUp, and AreaDenial are turret styles.
        _ => {}
    }
}
