//! Per-tick battle systems, run in a fixed order by the engine:
//! scheduled effects, structure weapons, unit AI, movement, zones,
//! lifecycle, cleanup.

pub mod cleanup;
pub mod effects;
pub mod lifecycle;
pub mod movement;
pub mod snapshot;
pub mod turrets;
pub mod unit_ai;
pub mod zones;
