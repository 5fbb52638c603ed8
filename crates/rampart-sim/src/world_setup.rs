//! Entity spawn factories for setting up a raid.
//!
//! Loads the defender's base snapshot into the world and creates
//! attacker units with appropriate component bundles.

use std::fmt;

use hecs::{Entity, World};

use rampart_core::components::*;
use rampart_core::constants::SPLIT_HEALTH_FACTOR;
use rampart_core::enums::*;
use rampart_core::stats;
use rampart_core::types::{Footprint, GridPos, Position};

use crate::scenario::BaseLayout;

/// Raid setup failure. The only setup condition surfaced to the caller:
/// a base with nothing worth raiding cannot host a raid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    NoOpposingStructures,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::NoOpposingStructures => {
                write!(f, "base layout has no offensive or economy structures")
            }
        }
    }
}

impl std::error::Error for SetupError {}

/// Load the defender's base into the world. Assigns each economy
/// structure its loot share and returns the number of structures that
/// count toward destruction.
pub fn load_base(world: &mut World, layout: &BaseLayout, next_id: &mut u32) -> Result<u32, SetupError> {
    // Loot shares are proportional to capacity: a vault holds more of
    // the stored resources than an extractor.
    let total_capacity: u64 = layout
        .structures
        .iter()
        .map(|p| stats::structure_stats(p.kind, p.level).loot_capacity as u64)
        .sum();

    let mut defended = 0u32;
    for placed in &layout.structures {
        let s = stats::structure_stats(placed.kind, placed.level);
        let loot = if total_capacity > 0 {
            (layout.stored_resources as u64 * s.loot_capacity as u64 / total_capacity) as u32
        } else {
            0
        };
        let footprint = Footprint::new(
            GridPos {
                x: placed.x,
                y: placed.y,
            },
            s.footprint.0,
            s.footprint.1,
        );
        if matches!(s.role, StructureRole::Offensive | StructureRole::Economy) {
            defended += 1;
        }

        let id = alloc(next_id);
        let entity = world.spawn((
            Ident {
                id,
                owner: Owner::Defender,
            },
            Structure {
                kind: placed.kind,
                level: placed.level,
                footprint,
                role: s.role,
                loot,
            },
            Health::full(s.max_health),
        ));
        if s.role == StructureRole::Offensive {
            let _ = world.insert_one(entity, Turret::default());
        }
    }

    if defended == 0 {
        return Err(SetupError::NoOpposingStructures);
    }
    Ok(defended)
}

/// Spawn an attacker unit. Split children arrive with health scaled
/// down by the per-generation factor.
pub fn spawn_unit(
    world: &mut World,
    next_id: &mut u32,
    kind: UnitKind,
    level: u8,
    generation: u8,
    position: Position,
) -> (Entity, u32) {
    let s = stats::unit_stats(kind, level);
    let max_health = s.max_health * SPLIT_HEALTH_FACTOR.powi(generation as i32);

    let id = alloc(next_id);
    let entity = world.spawn((
        Ident {
            id,
            owner: Owner::Attacker,
        },
        Unit {
            kind,
            level,
            generation,
        },
        position,
        Health::full(max_health),
        Mover::default(),
        Combatant::default(),
    ));
    (entity, id)
}

fn alloc(next_id: &mut u32) -> u32 {
    let id = *next_id;
    *next_id += 1;
    id
}
