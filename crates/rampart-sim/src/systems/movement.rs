//! Waypoint integration and crowd separation.
//!
//! Moves each pathing unit along its cached waypoints at archetype
//! speed, then applies a small pairwise separation push among nearby
//! units so they do not stack on one tile.

use glam::Vec2;
use hecs::{Entity, World};

use rampart_core::components::{Health, Mover, Unit};
use rampart_core::constants::{DT, SEPARATION_PUSH};
use rampart_core::stats;
use rampart_core::types::Position;

use rampart_grid::pathing;

pub fn run(world: &mut World) {
    // Advance along cached waypoints.
    let mut moved: Vec<(Entity, Position)> = Vec::new();
    for (entity, (unit, pos, mover, health)) in
        world.query_mut::<(&Unit, &mut Position, &mut Mover, &Health)>()
    {
        if !health.is_alive() || !mover.has_path() {
            continue;
        }
        let speed = stats::unit_stats(unit.kind, unit.level).speed;
        let waypoint = mover.waypoints[mover.next_waypoint];
        *pos = pos.step_toward(&waypoint, speed * DT);
        if pos.range_to(&waypoint) < 1e-3 {
            mover.next_waypoint += 1;
        }
        moved.push((entity, *pos));
    }

    // Separation among units that moved this tick.
    let all: Vec<(Entity, Position)> = world
        .query::<(&Unit, &Position, &Health)>()
        .iter()
        .filter(|(_, (_, _, health))| health.is_alive())
        .map(|(entity, (_, pos, _))| (entity, *pos))
        .collect();

    for (entity, pos) in &moved {
        let neighbors: Vec<Position> = all
            .iter()
            .filter(|(other, _)| other != entity)
            .map(|(_, p)| *p)
            .collect();
        let push = pathing::separation_push(*pos, &neighbors);
        if push == Vec2::ZERO {
            continue;
        }
        if let Ok(mut p) = world.get::<&mut Position>(*entity) {
            *p = Position::from_vec2(p.as_vec2() + push * SEPARATION_PUSH * DT);
        }
    }
}
