//! Delayed-work schedule.
//!
//! Everything that resolves on a later tick — shell flight, staggered
//! spawns — is a `(due_tick, seq)` entry in a min-heap, processed at the
//! top of each tick in order. Entries carry stable ids, never entity
//! handles, so a subject that died in the meantime makes the entry a
//! no-op rather than a fault.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rampart_core::constants::DT;
use rampart_core::enums::{Owner, UnitKind};
use rampart_core::stats::ZoneSpec;
use rampart_core::types::Position;

/// A shell, glob, or beam arriving at its destination.
#[derive(Debug, Clone, Copy)]
pub struct ImpactSpec {
    /// Side the shot came from; victims are on the other one.
    pub owner: Owner,
    /// Single-target victim. Revalidated at arrival; a dangling id
    /// means the shot fizzles.
    pub target: Option<u32>,
    /// Aim point at fire time. Area effects land here regardless of
    /// what the victim did since.
    pub position: Position,
    pub damage: f32,
    /// Present for area shells; damage tapers in two flat tiers.
    pub splash_radius: Option<f32>,
    /// Applied when the victim turns out to be a wall.
    pub fortification_multiplier: f32,
    /// Ground-denial zone left at the impact point.
    pub zone: Option<ZoneSpec>,
}

/// A staggered unit arrival (split child, brood member).
#[derive(Debug, Clone, Copy)]
pub struct SpawnSpec {
    pub kind: UnitKind,
    pub level: u8,
    pub generation: u8,
    pub position: Position,
}

/// One scheduled piece of future work.
#[derive(Debug, Clone, Copy)]
pub enum Pending {
    Impact(ImpactSpec),
    Spawn(SpawnSpec),
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due_tick: u64,
    seq: u64,
    pending: Pending,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due_tick == other.due_tick && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due_tick, self.seq).cmp(&(other.due_tick, other.seq))
    }
}

/// Min-heap of pending work, ordered by due tick then insertion order.
#[derive(Debug, Default)]
pub struct EventSchedule {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl EventSchedule {
    pub fn push_at(&mut self, due_tick: u64, pending: Pending) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled {
            due_tick,
            seq,
            pending,
        }));
    }

    /// Pop the oldest entry due at or before `now`, if any.
    pub fn pop_due(&mut self, now: u64) -> Option<Pending> {
        match self.heap.peek() {
            Some(Reverse(scheduled)) if scheduled.due_tick <= now => {
                self.heap.pop().map(|Reverse(s)| s.pending)
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Whole ticks for a duration in seconds, at least one.
pub fn secs_to_ticks(secs: f32) -> u64 {
    ((secs / DT).round() as u64).max(1)
}

/// Ticks a projectile spends in flight over `dist` tiles.
pub fn flight_ticks(dist: f32, speed: f32) -> u64 {
    secs_to_ticks(dist / speed.max(0.1))
}
