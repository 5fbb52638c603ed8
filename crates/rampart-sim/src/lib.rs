//! Battle simulation engine for RAMPART.
//!
//! Owns the hecs ECS world, runs the per-tick systems in a fixed order,
//! and produces RaidSnapshots for the surrounding application.

pub mod engine;
pub mod raid;
pub mod scenario;
pub mod schedule;
pub mod systems;
pub mod world_setup;

pub use engine::RaidEngine;
pub use rampart_core as core;

#[cfg(test)]
mod tests;
