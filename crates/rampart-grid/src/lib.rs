//! Grid services for RAMPART.
//!
//! Target selection, path planning, and deployment placement as pure
//! functions over plain data. No ECS dependency — the engine extracts
//! candidate slices and hands them in.

pub use rampart_core as core;

pub mod pathing;
pub mod placement;
pub mod targeting;

// Re-export key types for convenience.
pub use pathing::{plan_path, Blocker, PathPlan};
pub use placement::{classify_placement, Placement};
pub use targeting::{find_structure_target, find_unit_target, StructureCandidate, UnitCandidate};
