//! Per-type, per-level combat stat lookup.
//!
//! Pure functions over the archetype tables. Level scaling is geometric:
//! health and damage grow by a fixed factor per level above 1.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{StructureKind, StructureRole, UnitKind};

/// Parameters of a ground-denial zone left by an attack or a death.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub radius: f32,
    pub damage_per_tick: f32,
    pub tick_interval_secs: f32,
    pub duration_secs: f32,
    /// One-time hit applied to units present when the zone lands.
    pub impact_damage: f32,
}

/// How an attack resolves once the cooldown opens. A closed set: every
/// weapon in the game is one of these, dispatched in the effect resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Damage lands on the same tick.
    Melee,
    /// Damage lands after simulated flight at `speed` tiles/sec.
    Projectile { speed: f32 },
    /// Lobbed shell; area damage around the impact point.
    Splash { speed: f32, radius: f32 },
    /// Discharge hopping between nearby victims with per-hop decay.
    Chain { hops: u8, hop_range: f32 },
    /// Wind-up beam. The target is locked when charging begins.
    ChargeUp { charge_secs: f32 },
    /// One splash burst centered on the actor, which is then removed.
    SelfDestruct { radius: f32 },
    /// Lobbed glob that leaves a damage-over-time zone.
    AreaDenial { speed: f32, zone: ZoneSpec },
}

/// Combat stats for one structure archetype at one level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StructureStats {
    pub max_health: f32,
    pub damage: f32,
    pub range: f32,
    pub dead_zone: f32,
    pub fire_interval_secs: f32,
    /// None for structures with no weapon.
    pub style: Option<AttackStyle>,
    pub footprint: (i32, i32),
    pub role: StructureRole,
    /// Relative share of the defender's stored resources this structure
    /// holds. Zero for structures that carry no loot.
    pub loot_capacity: u32,
}

/// Combat stats for one unit archetype at one level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitStats {
    pub max_health: f32,
    pub damage: f32,
    pub range: f32,
    pub dead_zone: f32,
    pub speed: f32,
    pub fire_interval_secs: f32,
    pub style: AttackStyle,
    /// Damage multiplier against walls.
    pub fortification_multiplier: f32,
    /// Whether the unit seeks out walls as primary targets.
    pub prefers_fortifications: bool,
}

fn scaled(base: f32, factor: f32, level: u8) -> f32 {
    base * factor.powi(level.max(1) as i32 - 1)
}

/// Stat lookup for a structure archetype at a level.
pub fn structure_stats(kind: StructureKind, level: u8) -> StructureStats {
    let base = structure_base(kind);
    StructureStats {
        max_health: scaled(base.max_health, LEVEL_HEALTH_FACTOR, level),
        damage: scaled(base.damage, LEVEL_DAMAGE_FACTOR, level),
        ..base
    }
}

/// Stat lookup for a unit archetype at a level.
pub fn unit_stats(kind: UnitKind, level: u8) -> UnitStats {
    let base = unit_base(kind);
    UnitStats {
        max_health: scaled(base.max_health, LEVEL_HEALTH_FACTOR, level),
        damage: scaled(base.damage, LEVEL_DAMAGE_FACTOR, level),
        ..base
    }
}

fn structure_base(kind: StructureKind) -> StructureStats {
    use StructureKind::*;
    match kind {
        Cannon => StructureStats {
            max_health: 420.0,
            damage: 25.0,
            range: 9.0,
            dead_zone: 0.0,
            fire_interval_secs: 0.8,
            style: Some(AttackStyle::Projectile { speed: 14.0 }),
            footprint: (3, 3),
            role: StructureRole::Offensive,
            loot_capacity: 0,
        },
        SpikeThrower => StructureStats {
            max_health: 380.0,
            damage: 14.0,
            range: 11.0,
            dead_zone: 0.0,
            fire_interval_secs: 0.5,
            style: Some(AttackStyle::Projectile { speed: 16.0 }),
            footprint: (3, 3),
            role: StructureRole::Offensive,
            loot_capacity: 0,
        },
        Mortar => StructureStats {
            max_health: 350.0,
            damage: 40.0,
            range: 11.0,
            dead_zone: 4.0,
            fire_interval_secs: 5.0,
            style: Some(AttackStyle::Splash {
                speed: 5.0,
                radius: 1.5,
            }),
            footprint: (3, 3),
            role: StructureRole::Offensive,
            loot_capacity: 0,
        },
        TeslaCoil => StructureStats {
            max_health: 300.0,
            damage: 30.0,
            range: 7.0,
            dead_zone: 0.0,
            fire_interval_secs: 2.5,
            style: Some(AttackStyle::Chain {
                hops: 4,
                hop_range: 3.0,
            }),
            footprint: (2, 2),
            role: StructureRole::Offensive,
            loot_capacity: 0,
        },
        PrismTower => StructureStats {
            max_health: 450.0,
            damage: 90.0,
            range: 10.0,
            dead_zone: 0.0,
            fire_interval_secs: 6.0,
            style: Some(AttackStyle::ChargeUp { charge_secs: 1.5 }),
            footprint: (3, 3),
            role: StructureRole::Offensive,
            loot_capacity: 0,
        },
        AcidSprayer => StructureStats {
            max_health: 320.0,
            damage: 0.0,
            range: 8.0,
            dead_zone: 0.0,
            fire_interval_secs: 6.0,
            style: Some(AttackStyle::AreaDenial {
                speed: 6.0,
                zone: ZoneSpec {
                    radius: 1.8,
                    damage_per_tick: 6.0,
                    tick_interval_secs: 0.5,
                    duration_secs: 5.0,
                    impact_damage: 15.0,
                },
            }),
            footprint: (3, 3),
            role: StructureRole::Offensive,
            loot_capacity: 0,
        },
        Vault => StructureStats {
            max_health: 500.0,
            damage: 0.0,
            range: 0.0,
            dead_zone: 0.0,
            fire_interval_secs: 0.0,
            style: None,
            footprint: (3, 3),
            role: StructureRole::Economy,
            loot_capacity: 1000,
        },
        Extractor => StructureStats {
            max_health: 300.0,
            damage: 0.0,
            range: 0.0,
            dead_zone: 0.0,
            fire_interval_secs: 0.0,
            style: None,
            footprint: (3, 3),
            role: StructureRole::Economy,
            loot_capacity: 250,
        },
        Headquarters => StructureStats {
            max_health: 900.0,
            damage: 0.0,
            range: 0.0,
            dead_zone: 0.0,
            fire_interval_secs: 0.0,
            style: None,
            footprint: (4, 4),
            role: StructureRole::Economy,
            loot_capacity: 500,
        },
        AcidVat => StructureStats {
            max_health: 280.0,
            damage: 0.0,
            range: 0.0,
            dead_zone: 0.0,
            fire_interval_secs: 0.0,
            style: None,
            footprint: (2, 2),
            role: StructureRole::Economy,
            loot_capacity: 100,
        },
        Wall => StructureStats {
            max_health: 250.0,
            damage: 0.0,
            range: 0.0,
            dead_zone: 0.0,
            fire_interval_secs: 0.0,
            style: None,
            footprint: (1, 1),
            role: StructureRole::Other,
            loot_capacity: 0,
        },
    }
}

/// Hazard pool spilled by a destroyed acid vat.
pub fn vat_hazard_zone() -> ZoneSpec {
    ZoneSpec {
        radius: 2.0,
        damage_per_tick: 10.0,
        tick_interval_secs: 0.5,
        duration_secs: 4.0,
        impact_damage: 0.0,
    }
}

fn unit_base(kind: UnitKind) -> UnitStats {
    use UnitKind::*;
    match kind {
        Grunt => UnitStats {
            max_health: 120.0,
            damage: 18.0,
            range: 0.5,
            dead_zone: 0.0,
            speed: 1.6,
            fire_interval_secs: 1.0,
            style: AttackStyle::Melee,
            fortification_multiplier: 1.0,
            prefers_fortifications: false,
        },
        Archer => UnitStats {
            max_health: 45.0,
            damage: 12.0,
            range: 3.5,
            dead_zone: 0.0,
            speed: 2.0,
            fire_interval_secs: 1.0,
            style: AttackStyle::Projectile { speed: 12.0 },
            fortification_multiplier: 1.0,
            prefers_fortifications: false,
        },
        Lobber => UnitStats {
            max_health: 60.0,
            damage: 25.0,
            range: 5.0,
            dead_zone: 2.0,
            speed: 1.4,
            fire_interval_secs: 2.0,
            style: AttackStyle::Splash {
                speed: 6.0,
                radius: 1.5,
            },
            fortification_multiplier: 1.0,
            prefers_fortifications: false,
        },
        Sapper => UnitStats {
            max_health: 35.0,
            damage: 60.0,
            range: 0.5,
            dead_zone: 0.0,
            speed: 2.6,
            fire_interval_secs: 1.0,
            style: AttackStyle::SelfDestruct { radius: 1.2 },
            fortification_multiplier: 10.0,
            prefers_fortifications: true,
        },
        Blob => UnitStats {
            max_health: 90.0,
            damage: 10.0,
            range: 0.4,
            dead_zone: 0.0,
            speed: 1.8,
            fire_interval_secs: 1.0,
            style: AttackStyle::Melee,
            fortification_multiplier: 1.0,
            prefers_fortifications: false,
        },
        Carrier => UnitStats {
            max_health: 200.0,
            damage: 14.0,
            range: 0.5,
            dead_zone: 0.0,
            speed: 1.0,
            fire_interval_secs: 1.2,
            style: AttackStyle::Melee,
            fortification_multiplier: 1.0,
            prefers_fortifications: false,
        },
        Mite => UnitStats {
            max_health: 20.0,
            damage: 6.0,
            range: 0.4,
            dead_zone: 0.0,
            speed: 3.0,
            fire_interval_secs: 0.6,
            style: AttackStyle::Melee,
            fortification_multiplier: 1.0,
            prefers_fortifications: false,
        },
    }
}

/// Whether this unit archetype splits into copies of itself on death.
pub fn splits_on_death(kind: UnitKind) -> bool {
    matches!(kind, UnitKind::Blob)
}

/// The brood type released on death, if any.
pub fn brood_on_death(kind: UnitKind) -> Option<UnitKind> {
    match kind {
        UnitKind::Carrier => Some(UnitKind::Mite),
        _ => None,
    }
}
