//! Snapshot system: queries the world and builds a complete
//! RaidSnapshot.
//!
//! Read-only over the world; views are sorted by id so serialization
//! is deterministic.

use hecs::World;

use rampart_core::components::*;
use rampart_core::enums::StructureRole;
use rampart_core::events::BattleEvent;
use rampart_core::state::*;
use rampart_core::types::{Position, SimTime};

use crate::raid::{destruction_pct, RaidState};

/// Build a complete RaidSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    raid: &RaidState,
    events: Vec<BattleEvent>,
) -> RaidSnapshot {
    let structures = build_structures(world);
    let units = build_units(world);
    let zones = build_zones(world, time.tick);

    let remaining = structures
        .iter()
        .filter(|s| matches!(s.role, StructureRole::Offensive | StructureRole::Economy))
        .count() as u32;

    RaidSnapshot {
        time: *time,
        phase: raid.phase,
        score: ScoreView {
            initial_defenses: raid.initial_defenses,
            destroyed: raid.destroyed,
            destruction_pct: destruction_pct(raid.initial_defenses, raid.destroyed, remaining),
            loot: raid.loot,
            reinforcements_left: raid.reinforcements_remaining(),
            live_units: units.len() as u32,
            pending_spawns: raid.pending_spawns,
        },
        structures,
        units,
        zones,
        events,
        result: raid.result,
    }
}

fn build_structures(world: &World) -> Vec<StructureView> {
    let mut views: Vec<StructureView> = world
        .query::<(&Ident, &Structure, &Health, Option<&Turret>)>()
        .iter()
        .filter(|(_, (_, _, health, _))| health.is_alive())
        .map(|(_, (ident, structure, health, turret))| StructureView {
            id: ident.id,
            kind: structure.kind,
            level: structure.level,
            footprint: structure.footprint,
            health: health.current,
            max_health: health.max,
            role: structure.role,
            charge: turret.map(|t| t.charge).unwrap_or_default(),
            facing: turret.map(|t| t.facing).unwrap_or(0.0),
        })
        .collect();
    views.sort_by_key(|v| v.id);
    views
}

fn build_units(world: &World) -> Vec<UnitView> {
    let mut views: Vec<UnitView> = world
        .query::<(&Ident, &Unit, &Position, &Health, &Combatant)>()
        .iter()
        .filter(|(_, (_, _, _, health, _))| health.is_alive())
        .map(|(_, (ident, unit, pos, health, combatant))| UnitView {
            id: ident.id,
            kind: unit.kind,
            position: *pos,
            health: health.current,
            max_health: health.max,
            generation: unit.generation,
            target: combatant.target,
        })
        .collect();
    views.sort_by_key(|v| v.id);
    views
}

fn build_zones(world: &World, now: u64) -> Vec<ZoneView> {
    let mut views: Vec<ZoneView> = world
        .query::<(&Ident, &Zone, &Position)>()
        .iter()
        .map(|(_, (ident, zone, pos))| ZoneView {
            id: ident.id,
            position: *pos,
            radius: zone.radius,
            fade: ZoneView::fade_at(now, zone.expires_at_tick),
        })
        .collect();
    views.sort_by_key(|v| v.id);
    views
}
