// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall self-correction: force every wall onto its dominant axis.
//!
//! Floor plans are assumed orthogonal, so a wall drifting a few pixels over
//! its length is collapsed onto the floored average of its two coordinates
//! along the minor axis. Genuinely diagonal walls do not survive this pass.

use tracing::info;

use crate::types::{Orientation, Segment};

/// Straighten one wall onto its dominant axis
pub fn correct_wall(wall: &Segment) -> Segment {
    let mut fixed = wall.clone();

    if wall.orientation() == Orientation::Vertical {
        let avg_x = ((wall.start.x + wall.end.x) / 2.0).floor();
        fixed.start.x = avg_x;
        fixed.end.x = avg_x;
    } else {
        // Horizontal, or |dx| == |dy|
        let avg_y = ((wall.start.y + wall.end.y) / 2.0).floor();
        fixed.start.y = avg_y;
        fixed.end.y = avg_y;
    }

    fixed
}

/// Straighten every wall in a list.
///
/// Segments explicitly tagged as stairs pass through unchanged.
pub fn correct_walls(walls: &[Segment]) -> Vec<Segment> {
    let corrected: Vec<Segment> = walls
        .iter()
        .map(|w| if w.is_stair() { w.clone() } else { correct_wall(w) })
        .collect();

    let changed = walls
        .iter()
        .zip(&corrected)
        .filter(|(a, b)| !a.coordinates_equal(b))
        .count();
    info!(walls = walls.len(), changed, "wall self-correction complete");

    corrected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point2D;

    #[test]
    fn test_vertical_wall_collapses_x() {
        let fixed = correct_wall(&Segment::wall(100.0, 0.0, 103.0, 200.0));
        assert_eq!(fixed.start, Point2D::new(101.0, 0.0));
        assert_eq!(fixed.end, Point2D::new(101.0, 200.0));
    }

    #[test]
    fn test_horizontal_wall_collapses_y() {
        let fixed = correct_wall(&Segment::wall(0.0, 51.0, 300.0, 48.0));
        assert_eq!(fixed.start.y, 49.0);
        assert_eq!(fixed.end.y, 49.0);
        assert_eq!(fixed.start.x, 0.0);
        assert_eq!(fixed.end.x, 300.0);
    }

    #[test]
    fn test_equal_extent_treated_as_horizontal() {
        let fixed = correct_wall(&Segment::wall(0.0, 0.0, 10.0, 10.0));
        assert_eq!(fixed.start, Point2D::new(0.0, 5.0));
        assert_eq!(fixed.end, Point2D::new(10.0, 5.0));
    }

    #[test]
    fn test_negative_average_floors() {
        let fixed = correct_wall(&Segment::wall(-3.0, 0.0, -4.0, 100.0));
        assert_eq!(fixed.start.x, -4.0);
    }

    #[test]
    fn test_idempotent() {
        let walls = vec![
            Segment::wall(100.0, 0.0, 103.0, 200.0),
            Segment::wall(0.0, 51.0, 300.0, 48.0),
            Segment::wall(7.0, 7.0, 7.0, 7.0),
        ];
        let once = correct_walls(&walls);
        let twice = correct_walls(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_stairs_untouched() {
        let stair = Segment::stair(0.0, 0.0, 3.0, 100.0);
        assert_eq!(correct_walls(&[stair.clone()]), vec![stair]);
    }
}
