//! Effect resolver — the one place damage lands and deaths resolve.
//!
//! Every damage source funnels through `apply_damage`, which clamps
//! health at zero and runs death handling exactly once per entity:
//! loot award, removal, target-reference clearing, and on-death
//! spawning. Scheduled impacts, splash, chains, and zone creation all
//! live here too, so their ordering is reviewable in one file.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::enums::*;
use rampart_core::events::BattleEvent;
use rampart_core::stats::{self, ZoneSpec};
use rampart_core::types::Position;

use crate::raid::RaidState;
use crate::schedule::{secs_to_ticks, EventSchedule, ImpactSpec, Pending, SpawnSpec};
use crate::world_setup;

/// Mutable battle context threaded through the systems each tick.
pub struct BattleCtx<'a> {
    pub raid: &'a mut RaidState,
    pub schedule: &'a mut EventSchedule,
    pub events: &'a mut Vec<BattleEvent>,
    pub despawn: &'a mut Vec<Entity>,
    pub rng: &'a mut ChaCha8Rng,
    pub next_id: &'a mut u32,
    pub now: u64,
}

impl BattleCtx<'_> {
    fn alloc_id(&mut self) -> u32 {
        let id = *self.next_id;
        *self.next_id += 1;
        id
    }
}

/// Look up a live entity by its stable id. A dangling id returns None.
pub fn find_by_id(world: &World, id: u32) -> Option<Entity> {
    world
        .query::<&Ident>()
        .iter()
        .find(|(_, ident)| ident.id == id)
        .map(|(entity, _)| entity)
}

/// Process every scheduled event due this tick, oldest first. Each
/// event's damage is applied in full before the next one resolves.
pub fn process_due(world: &mut World, ctx: &mut BattleCtx) {
    loop {
        let pending = match ctx.schedule.pop_due(ctx.now) {
            Some(p) => p,
            None => break,
        };
        match pending {
            Pending::Impact(spec) => resolve_impact(world, ctx, spec),
            Pending::Spawn(spec) => resolve_spawn(world, ctx, spec),
        }
    }
}

fn resolve_impact(world: &mut World, ctx: &mut BattleCtx, spec: ImpactSpec) {
    if let Some(radius) = spec.splash_radius {
        resolve_splash(
            world,
            ctx,
            spec.owner,
            spec.position,
            radius,
            spec.damage,
            spec.fortification_multiplier,
        );
    } else if let Some(target_id) = spec.target {
        match find_by_id(world, target_id) {
            Some(entity) => {
                let mult = wall_multiplier(world, entity, spec.fortification_multiplier);
                apply_damage(world, ctx, entity, spec.damage * mult);
            }
            // Victim gone since fire time: the shot fizzles.
            None => {}
        }
    }

    if let Some(zone) = spec.zone {
        spawn_zone(world, ctx, spec.position, zone, spec.owner);
    }
}

fn resolve_spawn(world: &mut World, ctx: &mut BattleCtx, spec: SpawnSpec) {
    ctx.raid.pending_spawns = ctx.raid.pending_spawns.saturating_sub(1);
    let (_, id) = world_setup::spawn_unit(
        world,
        ctx.next_id,
        spec.kind,
        spec.level,
        spec.generation,
        spec.position,
    );
    ctx.events.push(BattleEvent::UnitDeployed {
        id,
        kind: spec.kind,
        position: spec.position,
    });
}

/// Subtract damage, clamp at zero, and trigger death handling on the
/// transition to zero. Hitting an already-dead or removed entity is a
/// silent no-op.
pub fn apply_damage(world: &mut World, ctx: &mut BattleCtx, entity: Entity, amount: f32) {
    let died = match world.get::<&mut Health>(entity) {
        Ok(mut health) => {
            if !health.is_alive() {
                return;
            }
            health.current = (health.current - amount).max(0.0);
            !health.is_alive()
        }
        Err(_) => return,
    };
    if died {
        handle_death(world, ctx, entity);
    }
}

/// Remove an entity through the normal death path regardless of its
/// remaining health.
pub fn kill(world: &mut World, ctx: &mut BattleCtx, entity: Entity) {
    let remaining = match world.get::<&Health>(entity) {
        Ok(health) => health.current,
        Err(_) => return,
    };
    if remaining > 0.0 {
        apply_damage(world, ctx, entity, remaining);
    }
}

fn handle_death(world: &mut World, ctx: &mut BattleCtx, entity: Entity) {
    let ident = match world.get::<&Ident>(entity) {
        Ok(ident) => *ident,
        Err(_) => return,
    };

    if let Ok(structure) = world.get::<&Structure>(entity).map(|s| *s) {
        die_structure(world, ctx, entity, ident, structure);
    } else if let Ok(unit) = world.get::<&Unit>(entity).map(|u| *u) {
        die_unit(world, ctx, entity, ident, unit);
    }
}

fn die_structure(
    world: &mut World,
    ctx: &mut BattleCtx,
    entity: Entity,
    ident: Ident,
    structure: Structure,
) {
    if structure.loot > 0 {
        ctx.raid.loot += structure.loot;
    }
    if matches!(
        structure.role,
        StructureRole::Offensive | StructureRole::Economy
    ) {
        ctx.raid.destroyed += 1;
    }
    ctx.events.push(BattleEvent::StructureDestroyed {
        id: ident.id,
        kind: structure.kind,
        loot: structure.loot,
    });

    // A ruptured vat spills over its own footprint.
    if structure.kind == StructureKind::AcidVat {
        spawn_zone(
            world,
            ctx,
            structure.footprint.center(),
            stats::vat_hazard_zone(),
            ident.owner,
        );
    }

    // Drop every unit's pointer at the corpse; holders re-acquire on
    // their next evaluation. Charge locks are left in place — a
    // mid-charge turret completes its wind-up and wastes the shot.
    for (_entity, combatant) in world.query_mut::<&mut Combatant>() {
        if combatant.target == Some(ident.id) {
            combatant.target = None;
        }
    }

    ctx.despawn.push(entity);
}

fn die_unit(world: &mut World, ctx: &mut BattleCtx, entity: Entity, ident: Ident, unit: Unit) {
    ctx.events.push(BattleEvent::UnitDied {
        id: ident.id,
        kind: unit.kind,
    });
    let position = world
        .get::<&Position>(entity)
        .map(|p| *p)
        .unwrap_or_default();

    if stats::splits_on_death(unit.kind) && unit.generation < MAX_SPLIT_GENERATION {
        let generation = unit.generation + 1;
        ctx.events.push(BattleEvent::UnitSplit {
            parent: ident.id,
            generation,
        });
        for i in 0..SPLIT_CHILDREN as u64 {
            let dx = ctx.rng.gen_range(-SPLIT_SCATTER_RADIUS..=SPLIT_SCATTER_RADIUS);
            let dy = ctx.rng.gen_range(-SPLIT_SCATTER_RADIUS..=SPLIT_SCATTER_RADIUS);
            let spot = clamp_to_map(Position::new(position.x + dx, position.y + dy));
            ctx.raid.pending_spawns += 1;
            ctx.schedule.push_at(
                ctx.now + SPLIT_STAGGER_TICKS * (i + 1),
                Pending::Spawn(SpawnSpec {
                    kind: unit.kind,
                    level: unit.level,
                    generation,
                    position: spot,
                }),
            );
        }
    }

    // One-time brood fan-out; the brood type has no death behavior of
    // its own, so this never recurses.
    if let Some(brood) = stats::brood_on_death(unit.kind) {
        let half = BROOD_GRID_EDGE / 2;
        let mut slot = 0u64;
        for gy in -half..=half {
            for gx in -half..=half {
                let spot = clamp_to_map(Position::new(
                    position.x + gx as f32 * BROOD_GRID_SPACING,
                    position.y + gy as f32 * BROOD_GRID_SPACING,
                ));
                ctx.raid.pending_spawns += 1;
                ctx.schedule.push_at(
                    ctx.now + BROOD_STAGGER_TICKS * (slot + 1),
                    Pending::Spawn(SpawnSpec {
                        kind: brood,
                        level: unit.level,
                        generation: 0,
                        position: spot,
                    }),
                );
                slot += 1;
            }
        }
    }

    ctx.despawn.push(entity);
}

/// Area damage around an impact point. Falloff is a flat two-tier
/// split: full damage inside the near band, a fixed fraction from
/// there to the edge, nothing beyond it.
#[allow(clippy::too_many_arguments)]
pub fn resolve_splash(
    world: &mut World,
    ctx: &mut BattleCtx,
    owner: Owner,
    center: Position,
    radius: f32,
    damage: f32,
    fortification_multiplier: f32,
) {
    let mut victims: Vec<(u32, Entity, f32)> = Vec::new();
    match owner {
        Owner::Attacker => {
            for (entity, (ident, structure, health)) in
                world.query::<(&Ident, &Structure, &Health)>().iter()
            {
                if !health.is_alive() {
                    continue;
                }
                let dist = structure.footprint.distance_to(&center);
                if dist > radius {
                    continue;
                }
                let mult = if structure.kind == StructureKind::Wall {
                    fortification_multiplier
                } else {
                    1.0
                };
                victims.push((ident.id, entity, tiered_damage(damage, dist, radius) * mult));
            }
        }
        Owner::Defender => {
            for (entity, (ident, _unit, pos, health)) in
                world.query::<(&Ident, &Unit, &Position, &Health)>().iter()
            {
                if !health.is_alive() {
                    continue;
                }
                let dist = pos.range_to(&center);
                if dist > radius {
                    continue;
                }
                victims.push((ident.id, entity, tiered_damage(damage, dist, radius)));
            }
        }
    }

    victims.sort_by_key(|(id, _, _)| *id);
    for (_, entity, dmg) in victims {
        apply_damage(world, ctx, entity, dmg);
    }
}

fn tiered_damage(damage: f32, dist: f32, radius: f32) -> f32 {
    if dist <= radius * SPLASH_NEAR_FRACTION {
        damage
    } else {
        damage * SPLASH_EDGE_DAMAGE_FRACTION
    }
}

/// Chained discharge: start at the primary victim and greedily hop to
/// the nearest not-yet-hit unit within reach, decaying per hop. Stops
/// early when nothing eligible remains in range.
pub fn resolve_chain(
    world: &mut World,
    ctx: &mut BattleCtx,
    first_target: u32,
    damage: f32,
    hops: u8,
    hop_range: f32,
) {
    let units: Vec<(u32, Entity, Position)> = world
        .query::<(&Ident, &Unit, &Position, &Health)>()
        .iter()
        .filter(|(_, (_, _, _, health))| health.is_alive())
        .map(|(entity, (ident, _, pos, _))| (ident.id, entity, *pos))
        .collect();

    let first = match units.iter().find(|(id, _, _)| *id == first_target) {
        Some(hit) => *hit,
        None => return,
    };

    let mut plan: Vec<(Entity, f32)> = vec![(first.1, damage)];
    let mut visited = vec![first_target];
    let mut cursor = first.2;
    let mut dmg = damage;

    for _ in 1..hops {
        let mut best: Option<(f32, u32, Entity, Position)> = None;
        for (id, entity, pos) in &units {
            if visited.contains(id) {
                continue;
            }
            let dist = cursor.range_to(pos);
            if dist > hop_range {
                continue;
            }
            let better = match best {
                None => true,
                Some((bd, bid, _, _)) => dist < bd || (dist == bd && *id < bid),
            };
            if better {
                best = Some((dist, *id, *entity, *pos));
            }
        }
        let (_, id, entity, pos) = match best {
            Some(next) => next,
            None => break,
        };
        dmg *= CHAIN_DAMAGE_DECAY;
        plan.push((entity, dmg));
        visited.push(id);
        cursor = pos;
    }

    for (entity, dmg) in plan {
        apply_damage(world, ctx, entity, dmg);
    }
}

/// Create a ground-denial zone and apply its one-time impact hit to
/// units caught at creation.
pub fn spawn_zone(
    world: &mut World,
    ctx: &mut BattleCtx,
    center: Position,
    spec: ZoneSpec,
    owner: Owner,
) {
    let id = ctx.alloc_id();
    let interval = secs_to_ticks(spec.tick_interval_secs);
    world.spawn((
        Ident { id, owner },
        center,
        Zone {
            radius: spec.radius,
            damage_per_tick: spec.damage_per_tick,
            interval_ticks: interval,
            next_tick_at: ctx.now + interval,
            created_at_tick: ctx.now,
            expires_at_tick: ctx.now + secs_to_ticks(spec.duration_secs),
            owner,
        },
    ));
    ctx.events.push(BattleEvent::ZoneSpawned {
        id,
        position: center,
        radius: spec.radius,
    });

    if spec.impact_damage > 0.0 {
        let mut caught: Vec<(u32, Entity)> = world
            .query::<(&Ident, &Unit, &Position, &Health)>()
            .iter()
            .filter(|(_, (ident, _, pos, health))| {
                ident.owner != owner && health.is_alive() && pos.range_to(&center) <= spec.radius
            })
            .map(|(entity, (ident, _, _, _))| (ident.id, entity))
            .collect();
        caught.sort_by_key(|(id, _)| *id);
        for (_, entity) in caught {
            apply_damage(world, ctx, entity, spec.impact_damage);
        }
    }
}

fn wall_multiplier(world: &World, entity: Entity, fortification_multiplier: f32) -> f32 {
    match world.get::<&Structure>(entity) {
        Ok(structure) if structure.kind == StructureKind::Wall => fortification_multiplier,
        _ => 1.0,
    }
}

fn clamp_to_map(p: Position) -> Position {
    let edge = MAP_SIZE as f32;
    Position::new(p.x.clamp(0.5, edge - 0.5), p.y.clamp(0.5, edge - 0.5))
}
