//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 20;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Map ---

/// Map edge length in tiles. The map is square.
pub const MAP_SIZE: i32 = 44;

/// Exclusion margin around every defender structure, in tiles.
/// Deployments inside a footprint expanded by this margin are rejected.
pub const EXCLUSION_MARGIN: f32 = 1.0;

// --- Movement ---

/// Seconds a cached path stays valid before it must be recomputed.
pub const REPATH_INTERVAL_SECS: f32 = 2.0;

/// Spacing of waypoints produced by the path resolver, in tiles.
pub const PATH_SAMPLE_STEP: f32 = 1.0;

/// Units closer than this push each other apart.
pub const SEPARATION_RADIUS: f32 = 0.7;

/// Separation push speed in tiles per second.
pub const SEPARATION_PUSH: f32 = 0.6;

/// Radius within which allies coordinate on a single break-in point.
pub const BREAKIN_RADIUS: f32 = 3.0;

// --- Attack resolution ---

/// Fraction of the splash radius inside which full damage applies.
pub const SPLASH_NEAR_FRACTION: f32 = 0.5;

/// Damage fraction applied between the near band and the splash edge.
/// A flat two-tier split, not a smooth falloff.
pub const SPLASH_EDGE_DAMAGE_FRACTION: f32 = 0.6;

/// Per-hop damage decay for chained discharges.
pub const CHAIN_DAMAGE_DECAY: f32 = 0.8;

// --- Splitting units ---

/// Children spawned per split.
pub const SPLIT_CHILDREN: u32 = 2;

/// Health factor applied per split generation.
pub const SPLIT_HEALTH_FACTOR: f32 = 0.7;

/// Deepest allowed split generation. A unit at this generation dies for good.
pub const MAX_SPLIT_GENERATION: u8 = 2;

/// Ticks between a split parent's death and each child's arrival.
pub const SPLIT_STAGGER_TICKS: u64 = 3;

/// Scatter radius for split children around the parent's corpse, in tiles.
pub const SPLIT_SCATTER_RADIUS: f32 = 0.6;

/// Brood grid edge for a carrier's death fan-out (grid is edge x edge).
pub const BROOD_GRID_EDGE: i32 = 3;

/// Tile spacing of the brood grid.
pub const BROOD_GRID_SPACING: f32 = 0.8;

/// Ticks between consecutive brood spawns.
pub const BROOD_STAGGER_TICKS: u64 = 2;

// --- Raid lifecycle ---

/// Grace delay between the end condition firing and the raid finalizing,
/// letting in-flight shells and staggered spawns resolve (seconds).
pub const ENDING_GRACE_SECS: f32 = 2.0;

/// Hard wall-clock limit on a raid (seconds).
pub const RAID_TIME_LIMIT_SECS: f32 = 180.0;

// --- Level scaling ---

/// Health multiplier per level above 1.
pub const LEVEL_HEALTH_FACTOR: f32 = 1.25;

/// Damage multiplier per level above 1.
pub const LEVEL_DAMAGE_FACTOR: f32 = 1.2;

// --- Presentation ---

/// Zone fade-out window before expiry (seconds). Rendering only; the zone
/// keeps ticking at full damage until it expires.
pub const ZONE_FADE_SECS: f32 = 1.0;
