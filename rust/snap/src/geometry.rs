// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point/segment primitives shared by the snapping stages

use crate::types::{Point2D, Segment};

/// Axis held constant while moving a point onto a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Project a point onto a line segment, clamped to the segment's endpoints.
///
/// A zero-length segment projects everything onto its start point.
pub fn project_point_on_segment(point: &Point2D, seg_start: &Point2D, seg_end: &Point2D) -> Point2D {
    let dx = seg_end.x - seg_start.x;
    let dy = seg_end.y - seg_start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq == 0.0 {
        return *seg_start;
    }

    let t = ((point.x - seg_start.x) * dx + (point.y - seg_start.y) * dy) / length_sq;
    let t = t.clamp(0.0, 1.0);

    Point2D::new(seg_start.x + t * dx, seg_start.y + t * dy)
}

/// Distance from a point to the closest point of a line segment
pub fn point_to_segment_distance(point: &Point2D, seg_start: &Point2D, seg_end: &Point2D) -> f64 {
    point.distance_to(&project_point_on_segment(point, seg_start, seg_end))
}

/// Distance from a point to a [`Segment`]
pub fn distance_to_segment(point: &Point2D, segment: &Segment) -> f64 {
    point_to_segment_distance(point, &segment.start, &segment.end)
}

/// Move `point` onto the infinite line through `line_start`/`line_end`
/// while holding one of its coordinates fixed.
///
/// Holding `Axis::X` keeps `point.x` exactly and solves the line for y;
/// holding `Axis::Y` keeps `point.y` and solves for x. The solved coordinate
/// is rounded to the pixel grid. Returns `None` when the line is parallel to
/// the direction of travel (or has zero length), since no such crossing exists.
pub fn axis_line_intersection(
    line_start: &Point2D,
    line_end: &Point2D,
    point: &Point2D,
    keep: Axis,
) -> Option<Point2D> {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;

    match keep {
        Axis::X => {
            if dx == 0.0 {
                return None;
            }
            let y = line_start.y + (point.x - line_start.x) * dy / dx;
            Some(Point2D::new(point.x, y.round_ties_even()))
        }
        Axis::Y => {
            if dy == 0.0 {
                return None;
            }
            let x = line_start.x + (point.y - line_start.y) * dx / dy;
            Some(Point2D::new(x.round_ties_even(), point.y))
        }
    }
}

/// Intersection of the infinite lines through `p1`-`p2` and `p3`-`p4`.
///
/// Uses the two-line determinant form; pairs with `|det| < epsilon` are
/// treated as parallel and yield `None`.
pub fn line_intersection(
    p1: &Point2D,
    p2: &Point2D,
    p3: &Point2D,
    p4: &Point2D,
    epsilon: f64,
) -> Option<Point2D> {
    let det = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if det.abs() < epsilon {
        return None;
    }

    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / det;

    Some(Point2D::new(
        p1.x + t * (p2.x - p1.x),
        p1.y + t * (p2.y - p1.y),
    ))
}

/// Round to a number of decimal places (half-to-even at the last digit)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_to_segment_distance() {
        let start = Point2D::new(0.0, 0.0);
        let end = Point2D::new(10.0, 0.0);

        assert_relative_eq!(point_to_segment_distance(&Point2D::new(5.0, 5.0), &start, &end), 5.0);
        // Beyond the end: distance to the end point, not the infinite line
        assert_relative_eq!(point_to_segment_distance(&Point2D::new(13.0, 4.0), &start, &end), 5.0);
    }

    #[test]
    fn test_projection_on_degenerate_segment() {
        let p = Point2D::new(3.0, 4.0);
        let s = Point2D::new(1.0, 1.0);
        assert_eq!(project_point_on_segment(&p, &s, &s), s);
        assert_relative_eq!(point_to_segment_distance(&p, &s, &s), (4.0f64 + 9.0).sqrt());
    }

    #[test]
    fn test_axis_line_intersection_keeps_axis() {
        // Slightly skewed horizontal line, vertical travel
        let a = Point2D::new(0.0, 100.0);
        let b = Point2D::new(200.0, 104.0);
        let hit = axis_line_intersection(&a, &b, &Point2D::new(50.0, 60.0), Axis::X).unwrap();
        assert_eq!(hit, Point2D::new(50.0, 101.0));

        // Extension past the segment's extent is allowed
        let hit = axis_line_intersection(&a, &b, &Point2D::new(300.0, 60.0), Axis::X).unwrap();
        assert_eq!(hit, Point2D::new(300.0, 106.0));
    }

    #[test]
    fn test_axis_line_intersection_parallel() {
        let a = Point2D::new(10.0, 0.0);
        let b = Point2D::new(10.0, 100.0);
        assert!(axis_line_intersection(&a, &b, &Point2D::new(0.0, 50.0), Axis::X).is_none());
        assert_eq!(
            axis_line_intersection(&a, &b, &Point2D::new(0.0, 50.0), Axis::Y),
            Some(Point2D::new(10.0, 50.0))
        );
    }

    #[test]
    fn test_line_intersection() {
        let hit = line_intersection(
            &Point2D::new(0.0, 0.0),
            &Point2D::new(-5000.0, 0.0),
            &Point2D::new(-20.0, -5.0),
            &Point2D::new(-20.0, 5.0),
            1e-10,
        )
        .unwrap();
        assert_relative_eq!(hit.x, -20.0);
        assert_relative_eq!(hit.y, 0.0);

        let parallel = line_intersection(
            &Point2D::new(0.0, 0.0),
            &Point2D::new(10.0, 0.0),
            &Point2D::new(0.0, 5.0),
            &Point2D::new(10.0, 5.0),
            1e-10,
        );
        assert!(parallel.is_none());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(5.04, 1), 5.0);
        assert_eq!(round_to(-10.0, 1), -10.0);
        assert_eq!(round_to(2.26, 1), 2.3);
    }
}
