//! Raid configuration, base layouts, and canned demo content.

use serde::{Deserialize, Serialize};

use rampart_core::enums::{StructureKind, UnitKind};
use rampart_core::types::Position;

/// One placed structure in a base layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlacedStructure {
    pub kind: StructureKind,
    pub level: u8,
    pub x: i32,
    pub y: i32,
}

/// The defender's base as loaded for a raid: a static snapshot of
/// structures plus the resources at stake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseLayout {
    pub defender_id: u64,
    /// Stored resources, distributed over economy structures as loot.
    pub stored_resources: u32,
    pub structures: Vec<PlacedStructure>,
}

/// One slice of the attacker's army.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArmyEntry {
    pub kind: UnitKind,
    pub count: u32,
}

/// Everything needed to start a raid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaidConfig {
    /// RNG seed for determinism. Same seed + same commands = same raid.
    pub seed: u64,
    pub attacker_id: u64,
    pub raid_id: Option<u64>,
    pub army: Vec<ArmyEntry>,
    pub layout: BaseLayout,
}

impl RaidConfig {
    /// Canned demo raid: the demo army against the demo base.
    pub fn demo() -> Self {
        Self {
            seed: 42,
            attacker_id: 1,
            raid_id: None,
            army: demo_army(),
            layout: demo_base(),
        }
    }
}

/// One scripted deployment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeployEntry {
    pub at_tick: u64,
    pub kind: UnitKind,
    pub position: Position,
}

/// A walled demo base: command core and storages inside a wall ring,
/// turrets covering the approaches.
pub fn demo_base() -> BaseLayout {
    let mut structures = Vec::new();
    let mut place = |kind: StructureKind, x: i32, y: i32| {
        structures.push(PlacedStructure {
            kind,
            level: 1,
            x,
            y,
        });
    };

    place(StructureKind::Headquarters, 20, 20);
    place(StructureKind::Vault, 14, 20);
    place(StructureKind::Extractor, 24, 17);
    place(StructureKind::AcidVat, 17, 25);

    place(StructureKind::Cannon, 14, 14);
    place(StructureKind::PrismTower, 19, 14);
    place(StructureKind::SpikeThrower, 24, 13);
    place(StructureKind::Mortar, 14, 26);
    place(StructureKind::AcidSprayer, 24, 25);
    place(StructureKind::TeslaCoil, 27, 20);

    // Perimeter ring.
    for x in 12..=30 {
        place(StructureKind::Wall, x, 12);
        place(StructureKind::Wall, x, 30);
    }
    for y in 13..=29 {
        place(StructureKind::Wall, 12, y);
        place(StructureKind::Wall, 30, y);
    }

    BaseLayout {
        defender_id: 2,
        stored_resources: 1800,
        structures,
    }
}

/// The demo attacking army.
pub fn demo_army() -> Vec<ArmyEntry> {
    vec![
        ArmyEntry {
            kind: UnitKind::Sapper,
            count: 2,
        },
        ArmyEntry {
            kind: UnitKind::Grunt,
            count: 6,
        },
        ArmyEntry {
            kind: UnitKind::Archer,
            count: 6,
        },
        ArmyEntry {
            kind: UnitKind::Lobber,
            count: 2,
        },
        ArmyEntry {
            kind: UnitKind::Blob,
            count: 3,
        },
        ArmyEntry {
            kind: UnitKind::Carrier,
            count: 1,
        },
    ]
}

/// Scripted drops for an army: staggered groups along the west approach.
pub fn demo_deploy_plan(army: &[ArmyEntry]) -> Vec<DeployEntry> {
    let mut entries = Vec::new();
    let mut slot = 0u64;
    for entry in army {
        for _ in 0..entry.count {
            let y = 12.0 + (slot % 10) as f32 * 2.0;
            entries.push(DeployEntry {
                at_tick: 5 + slot * 3,
                kind: entry.kind,
                position: Position::new(8.0, y),
            });
            slot += 1;
        }
    }
    entries
}
