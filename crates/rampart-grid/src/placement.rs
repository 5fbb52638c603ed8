//! Deployment placement validation.

use rampart_core::constants::{EXCLUSION_MARGIN, MAP_SIZE};
use rampart_core::types::{Footprint, Position};

/// Outcome of a placement check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Allowed,
    /// Outside the deployable map margin.
    OutOfBounds,
    /// Inside the defended exclusion zone around a structure.
    InsideExclusion,
}

/// Classify a deployment position against the map bounds and the
/// exclusion rectangles of the given structure footprints.
pub fn classify_placement(pos: Position, footprints: &[Footprint]) -> Placement {
    let edge = MAP_SIZE as f32;
    if pos.x < 0.0 || pos.y < 0.0 || pos.x > edge || pos.y > edge {
        return Placement::OutOfBounds;
    }
    for fp in footprints {
        if fp.contains(&pos, EXCLUSION_MARGIN) {
            return Placement::InsideExclusion;
        }
    }
    Placement::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::types::GridPos;

    #[test]
    fn test_out_of_bounds() {
        assert_eq!(
            classify_placement(Position::new(-1.0, 5.0), &[]),
            Placement::OutOfBounds
        );
        assert_eq!(
            classify_placement(Position::new(5.0, MAP_SIZE as f32 + 0.5), &[]),
            Placement::OutOfBounds
        );
    }

    #[test]
    fn test_exclusion_zone() {
        let fps = vec![Footprint::new(GridPos { x: 20, y: 20 }, 3, 3)];
        // Inside the footprint itself.
        assert_eq!(
            classify_placement(Position::new(21.0, 21.0), &fps),
            Placement::InsideExclusion
        );
        // Inside the margin band.
        assert_eq!(
            classify_placement(Position::new(19.5, 21.0), &fps),
            Placement::InsideExclusion
        );
        // Clear of the margin.
        assert_eq!(
            classify_placement(Position::new(15.0, 21.0), &fps),
            Placement::Allowed
        );
    }
}
