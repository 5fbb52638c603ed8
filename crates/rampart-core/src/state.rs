//! Raid state snapshot — the complete visible state produced each tick.

use serde::{Deserialize, Serialize};

use crate::constants::{DT, ZONE_FADE_SECS};
use crate::enums::*;
use crate::events::BattleEvent;
use crate::types::{Footprint, Position, SimTime};

/// Complete raid state handed to the surrounding application after each
/// tick. Views are sorted by id so serialization is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaidSnapshot {
    pub time: SimTime,
    pub phase: RaidPhase,
    pub structures: Vec<StructureView>,
    pub units: Vec<UnitView>,
    pub zones: Vec<ZoneView>,
    pub score: ScoreView,
    pub events: Vec<BattleEvent>,
    /// Present once the raid has ended.
    pub result: Option<RaidResult>,
}

/// A visible structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureView {
    pub id: u32,
    pub kind: StructureKind,
    pub level: u8,
    pub footprint: Footprint,
    pub health: f32,
    pub max_health: f32,
    pub role: StructureRole,
    pub charge: ChargePhase,
    /// Barrel orientation in radians, for facing-dependent sprites.
    pub facing: f32,
}

/// A visible unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitView {
    pub id: u32,
    pub kind: UnitKind,
    pub position: Position,
    pub health: f32,
    pub max_health: f32,
    pub generation: u8,
    pub target: Option<u32>,
}

/// A visible ground-denial zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneView {
    pub id: u32,
    pub position: Position,
    pub radius: f32,
    /// Render opacity over the final window: 1.0 while fresh, dropping to
    /// 0.0 at expiry. Presentation only.
    pub fade: f32,
}

impl ZoneView {
    /// Opacity for a zone expiring at `expires_at_tick`, seen at `now`.
    pub fn fade_at(now: u64, expires_at_tick: u64) -> f32 {
        let fade_ticks = (ZONE_FADE_SECS / DT) as u64;
        let remaining = expires_at_tick.saturating_sub(now);
        if remaining >= fade_ticks {
            1.0
        } else {
            remaining as f32 / fade_ticks as f32
        }
    }
}

/// Running raid score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreView {
    /// Opposing offensive + economy structures at raid start.
    pub initial_defenses: u32,
    pub destroyed: u32,
    pub destruction_pct: u32,
    pub loot: u32,
    pub reinforcements_left: u32,
    pub live_units: u32,
    pub pending_spawns: u32,
}

/// Terminal raid outcome, handed off for recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidResult {
    pub attacker_id: u64,
    pub defender_id: u64,
    pub loot: u32,
    pub destruction_pct: u32,
    pub raid_id: Option<u64>,
}
