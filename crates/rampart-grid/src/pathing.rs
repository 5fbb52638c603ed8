//! Path planning and crowd separation.
//!
//! The path resolver samples a straight corridor from the mover to its
//! goal. The first blocking footprint that is not the mover's own target
//! truncates the path and is reported, so the caller can attack through
//! it instead of stalling against it.

use glam::Vec2;

use rampart_core::constants::{PATH_SAMPLE_STEP, SEPARATION_RADIUS};
use rampart_core::types::{Footprint, Position};

/// A structure the path resolver must route around (or report).
#[derive(Debug, Clone, Copy)]
pub struct Blocker {
    pub id: u32,
    pub footprint: Footprint,
}

/// Result of a path request.
#[derive(Debug, Clone, Default)]
pub struct PathPlan {
    /// Ordered waypoints from the mover toward the goal. Truncated just
    /// short of the first blocker when one is hit.
    pub waypoints: Vec<Position>,
    /// The structure standing in the way, if the corridor is blocked.
    pub blocked_by: Option<u32>,
}

/// Plan a corridor from `from` toward `goal`.
///
/// `target_id` is the mover's current target; its footprint terminates
/// the path cleanly rather than blocking it.
pub fn plan_path(
    from: Position,
    goal: Position,
    target_id: Option<u32>,
    blockers: &[Blocker],
) -> PathPlan {
    let mut plan = PathPlan::default();

    let total = from.range_to(&goal);
    if total <= f32::EPSILON {
        return plan;
    }

    let steps = (total / PATH_SAMPLE_STEP).ceil() as u32;
    for i in 1..=steps {
        let t = (i as f32 / steps as f32).min(1.0);
        let p = Position::new(
            from.x + (goal.x - from.x) * t,
            from.y + (goal.y - from.y) * t,
        );

        if let Some(hit) = first_hit(&p, target_id, blockers) {
            plan.blocked_by = Some(hit);
            return plan;
        }
        plan.waypoints.push(p);
    }

    plan
}

fn first_hit(p: &Position, target_id: Option<u32>, blockers: &[Blocker]) -> Option<u32> {
    for b in blockers {
        if Some(b.id) == target_id {
            continue;
        }
        if b.footprint.contains(p, 0.0) {
            return Some(b.id);
        }
    }
    None
}

/// Pairwise separation push for a unit at `pos` among its neighbors.
///
/// Returns an unscaled direction; the mover applies its own push speed.
/// Exactly coincident neighbors push east so two stacked units still
/// come apart deterministically.
pub fn separation_push(pos: Position, neighbors: &[Position]) -> Vec2 {
    let mut push = Vec2::ZERO;
    for n in neighbors {
        let delta = pos.as_vec2() - n.as_vec2();
        let dist = delta.length();
        if dist >= SEPARATION_RADIUS {
            continue;
        }
        if dist <= f32::EPSILON {
            push += Vec2::X;
        } else {
            push += delta / dist * (1.0 - dist / SEPARATION_RADIUS);
        }
    }
    push
}
