//! Cleanup system: despawns entities buffered for removal this tick.
//!
//! Death side effects already ran in the effect resolver; this is the
//! single point where entities actually leave the world.

use hecs::{Entity, World};

pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
