//! Events emitted by the simulation for the presentation layer and the
//! surrounding application. Drained into each tick's snapshot.

use serde::{Deserialize, Serialize};

use crate::enums::{StructureKind, UnitKind};
use crate::types::Position;

/// One battle event. Serialized with a `type` tag for the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BattleEvent {
    /// A unit entered the field, by deployment or in-combat spawning.
    UnitDeployed {
        id: u32,
        kind: UnitKind,
        position: Position,
    },
    /// A structure was destroyed; its loot has been awarded.
    StructureDestroyed {
        id: u32,
        kind: StructureKind,
        loot: u32,
    },
    /// A unit died.
    UnitDied { id: u32, kind: UnitKind },
    /// A dying unit is splitting; children arrive over the next few ticks.
    UnitSplit { parent: u32, generation: u8 },
    /// A ground-denial zone appeared.
    ZoneSpawned {
        id: u32,
        position: Position,
        radius: f32,
    },
    /// Destruction percentage or loot total changed.
    Progress { destruction_pct: u32, loot: u32 },
    /// The raid finished. Emitted once, and only when no observer claimed
    /// the result first.
    RaidEnded { destruction_pct: u32, loot: u32 },
}
