//! Raid-wide mutable state and the result/observer seams.

use rampart_core::enums::{RaidPhase, UnitKind};
use rampart_core::state::RaidResult;

/// Counters and lifecycle state owned by the engine for one raid.
/// Systems receive this by reference; there is no ambient global state.
#[derive(Debug, Clone)]
pub struct RaidState {
    pub phase: RaidPhase,
    pub attacker_id: u64,
    pub defender_id: u64,
    pub raid_id: Option<u64>,
    /// Opposing offensive + economy structures at raid start.
    pub initial_defenses: u32,
    pub destroyed: u32,
    pub loot: u32,
    /// Staggered spawns still in flight. Incremented before each spawn
    /// is scheduled and decremented when it lands, so end detection
    /// never fires while a split is mid-air.
    pub pending_spawns: u32,
    /// Undeployed army, by kind.
    pub reinforcements: Vec<(UnitKind, u32)>,
    /// Tick at which the grace delay runs out, once Ending.
    pub ending_at_tick: Option<u64>,
    /// Last (destruction %, loot) reported to the progress sink.
    pub last_progress: Option<(u32, u32)>,
    /// Final outcome, set exactly once on Ended.
    pub result: Option<RaidResult>,
}

impl RaidState {
    pub fn reinforcements_remaining(&self) -> u32 {
        self.reinforcements.iter().map(|(_, count)| count).sum()
    }

    /// Consume one reinforcement of `kind`. False when none remain.
    pub fn take_reinforcement(&mut self, kind: UnitKind) -> bool {
        for (k, count) in &mut self.reinforcements {
            if *k == kind && *count > 0 {
                *count -= 1;
                return true;
            }
        }
        false
    }
}

/// Destruction percentage on the 0..=100 scale.
pub fn destruction_pct(initial: u32, destroyed: u32, remaining: u32) -> u32 {
    let denom = initial.max(destroyed + remaining).max(1);
    let pct = (100.0 * destroyed as f32 / denom as f32).round() as u32;
    pct.min(100)
}

/// Sink interface for the surrounding application. All methods have
/// default no-op implementations; `on_raid_ended` reports whether the
/// caller handled the result, so the engine can fall back to its
/// default event emission when nobody did.
pub trait RaidObserver {
    /// Called whenever destruction percentage or loot changes.
    fn on_progress(&mut self, _destruction_pct: u32, _loot: u32) {}

    /// Called exactly once when the raid reaches Ended. Return true if
    /// the result was handled.
    fn on_raid_ended(&mut self, _loot: u32) -> bool {
        false
    }
}
