//! Target selection.
//!
//! `find_structure_target` picks for attacking units, `find_unit_target`
//! for defending turrets. Both are nearest-first with stable id
//! tie-breaking so repeated calls over the same world agree.

use rampart_core::enums::{StructureKind, StructureRole};
use rampart_core::types::{Footprint, Position};

/// A live structure as seen by the targeting resolver.
#[derive(Debug, Clone, Copy)]
pub struct StructureCandidate {
    pub id: u32,
    pub kind: StructureKind,
    pub role: StructureRole,
    pub footprint: Footprint,
}

/// A live unit as seen by the targeting resolver.
#[derive(Debug, Clone, Copy)]
pub struct UnitCandidate {
    pub id: u32,
    pub position: Position,
}

/// Best structure target for a unit standing at `from`, or None.
///
/// Wall-seeking units head for the nearest wall when one exists. Everyone
/// else ignores walls here; walls only become targets through the
/// blocked-path retarget in the unit AI.
pub fn find_structure_target(
    from: Position,
    prefers_fortifications: bool,
    candidates: &[StructureCandidate],
) -> Option<u32> {
    if prefers_fortifications {
        if let Some(id) = nearest(from, candidates, |c| c.kind == StructureKind::Wall) {
            return Some(id);
        }
    }
    nearest(from, candidates, |c| c.kind != StructureKind::Wall)
}

/// Best unit target for a turret at `from`, or None. Victims inside the
/// dead zone or beyond `range` are not eligible.
pub fn find_unit_target(
    from: Position,
    range: f32,
    dead_zone: f32,
    candidates: &[UnitCandidate],
) -> Option<u32> {
    let mut best: Option<(f32, u32)> = None;
    for c in candidates {
        let dist = from.range_to(&c.position);
        if dist > range || dist < dead_zone {
            continue;
        }
        if closer(dist, c.id, best) {
            best = Some((dist, c.id));
        }
    }
    best.map(|(_, id)| id)
}

fn nearest(
    from: Position,
    candidates: &[StructureCandidate],
    eligible: impl Fn(&StructureCandidate) -> bool,
) -> Option<u32> {
    let mut best: Option<(f32, u32)> = None;
    for c in candidates {
        if !eligible(c) {
            continue;
        }
        let dist = c.footprint.distance_to(&from);
        if closer(dist, c.id, best) {
            best = Some((dist, c.id));
        }
    }
    best.map(|(_, id)| id)
}

fn closer(dist: f32, id: u32, best: Option<(f32, u32)>) -> bool {
    match best {
        None => true,
        Some((bd, bid)) => dist < bd || (dist == bd && id < bid),
    }
}
