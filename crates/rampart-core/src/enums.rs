//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Which side of the raid an entity belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    #[default]
    Attacker,
    Defender,
}

impl Owner {
    /// The opposing side.
    pub fn enemy(&self) -> Owner {
        match self {
            Owner::Attacker => Owner::Defender,
            Owner::Defender => Owner::Attacker,
        }
    }
}

/// Structure category for raid accounting. Destruction percentage counts
/// offensive and economy structures; walls and decorations do not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureRole {
    Offensive,
    Economy,
    #[default]
    Other,
}

/// Placeable structure archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Single-target turret with a slow, hard-hitting shell.
    Cannon,
    /// Fast single-target turret with long reach.
    SpikeThrower,
    /// Lobbed splash shell, long range with a blind spot up close.
    Mortar,
    /// Arcing discharge that hops between nearby attackers.
    TeslaCoil,
    /// Beam weapon with a wind-up; locks its victim while charging.
    PrismTower,
    /// Lobs acid globs that deny ground for a few seconds.
    AcidSprayer,
    /// Resource storage; the bulk of a defender's loot sits here.
    Vault,
    /// Resource production; carries a small loot share.
    Extractor,
    /// Command building. Large, tough, moderately valuable.
    Headquarters,
    /// Acid storage tank; spills a hazard pool when destroyed.
    AcidVat,
    /// Perimeter fortification.
    Wall,
}

/// Deployable unit archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Melee bruiser.
    Grunt,
    /// Ranged skirmisher.
    Archer,
    /// Lobbed splash attacker with a minimum range.
    Lobber,
    /// Suicide bomber; favors walls.
    Sapper,
    /// Gelatinous melee unit that splits in two when killed.
    Blob,
    /// Lumbering host; releases a brood of mites when killed.
    Carrier,
    /// Tiny, fast melee critter released by a carrier.
    Mite,
}

/// Wind-up weapon phase. Firing happens on the Charging -> Cooldown
/// transition once the wind-up has elapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargePhase {
    #[default]
    Idle,
    Charging,
    Cooldown,
}

/// Raid lifecycle state. Transitions are strictly forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RaidPhase {
    #[default]
    NotStarted,
    Deploying,
    Active,
    Ending,
    Ended,
}
