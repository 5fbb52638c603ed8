//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Battle logic lives in systems, not components.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{Footprint, Position};

/// Stable identity for cross-entity references. Target pointers hold the
/// `id`, never the hecs handle; a lookup that finds nothing means the
/// entity is gone and the holder must re-acquire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ident {
    pub id: u32,
    pub owner: Owner,
}

/// Hit points. `current` never exceeds `max` and never goes below zero;
/// an entity at zero is dead and awaiting removal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }
}

/// A placed base structure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Structure {
    pub kind: StructureKind,
    pub level: u8,
    pub footprint: Footprint,
    pub role: StructureRole,
    /// Loot awarded when destroyed. Assigned once at raid setup.
    pub loot: u32,
}

/// Weapon state for an offensive structure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Turret {
    /// Tick of the last shot, None before the first.
    pub last_fire_tick: Option<u64>,
    pub charge: ChargePhase,
    /// Tick at which the current charge began.
    pub charge_started_tick: u64,
    /// Victim locked at charge start. Kept even if it dies mid-charge.
    pub locked_target: Option<u32>,
    /// Cached barrel orientation in radians.
    pub facing: f32,
}

impl Default for Turret {
    fn default() -> Self {
        Self {
            last_fire_tick: None,
            charge: ChargePhase::Idle,
            charge_started_tick: 0,
            locked_target: None,
            facing: 0.0,
        }
    }
}

/// A deployed attacking unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Unit {
    pub kind: UnitKind,
    pub level: u8,
    /// Split depth for self-replicating archetypes. Zero for deployments.
    pub generation: u8,
}

/// Cached path and its recompute deadline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mover {
    pub waypoints: Vec<Position>,
    pub next_waypoint: usize,
    pub repath_at_tick: u64,
}

impl Mover {
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.next_waypoint = 0;
    }

    pub fn has_path(&self) -> bool {
        self.next_waypoint < self.waypoints.len()
    }
}

/// Attack state shared by all units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Combatant {
    /// Current target id. May dangle; validated on every use.
    pub target: Option<u32>,
    pub cooldown_until_tick: u64,
}

/// A timed ground-denial region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Zone {
    pub radius: f32,
    pub damage_per_tick: f32,
    pub interval_ticks: u64,
    pub next_tick_at: u64,
    pub created_at_tick: u64,
    pub expires_at_tick: u64,
    pub owner: Owner,
}
