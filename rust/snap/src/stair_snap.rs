// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapping stair segments onto the corrected wall set.
//!
//! Stairs are traced from a separate raster layer and never quite touch the
//! walls they attach to. Each stair endpoint is snapped with two strictly
//! ordered passes:
//!
//! 1. nearest wall *endpoint* closer than `endpoint_threshold`;
//! 2. only if pass 1 found nothing, nearest wall *segment* closer than
//!    `line_threshold`, snapping to the clamped perpendicular projection.
//!
//! The snapped set is then straightened, de-duplicated and finally merged
//! onto exact wall vertices so that graph building downstream sees shared
//! coordinates. The wall list is read-only throughout.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::geometry::{distance_to_segment, project_point_on_segment};
use crate::types::{End, Point2D, PointKey, Segment};
use crate::vertex_merge::merge_vertices;

/// Configuration for stair-to-wall snapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StairSnapConfig {
    /// Priority 1 radius: snap to a wall endpoint closer than this (pixels).
    /// Default: 50.0
    pub endpoint_threshold: f64,

    /// Priority 2 radius: snap onto a wall segment closer than this (pixels).
    /// Default: 30.0
    pub line_threshold: f64,

    /// Stairs whose x (or y) extent is within this become exactly vertical
    /// (or horizontal). Default: 10.0
    pub straighten_tolerance: f64,

    /// Tolerance for merging near-duplicate stair vertices. Default: 2.0
    pub vertex_merge_tolerance: f64,

    /// Stair vertices this close to a wall vertex adopt it exactly. Default: 5.0
    pub wall_merge_tolerance: f64,
}

impl Default for StairSnapConfig {
    fn default() -> Self {
        Self {
            endpoint_threshold: 50.0,
            line_threshold: 30.0,
            straighten_tolerance: 10.0,
            vertex_merge_tolerance: 2.0,
            wall_merge_tolerance: 5.0,
        }
    }
}

/// Where a stair endpoint was snapped
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapTarget {
    /// Priority 1: an exact wall endpoint
    WallEndpoint(Point2D),
    /// Priority 2: projection onto a wall segment
    WallLine(Point2D),
}

impl SnapTarget {
    pub fn point(&self) -> Point2D {
        match self {
            SnapTarget::WallEndpoint(p) | SnapTarget::WallLine(p) => *p,
        }
    }
}

/// Unique wall endpoints in first-seen order
pub fn wall_vertices(walls: &[Segment]) -> Vec<Point2D> {
    let mut seen = rustc_hash::FxHashSet::<PointKey>::default();
    walls
        .iter()
        .flat_map(|w| [w.start, w.end])
        .filter(|p| seen.insert(p.key()))
        .collect()
}

/// Priority 1: the nearest wall vertex strictly closer than `threshold`
pub fn nearest_wall_endpoint(point: &Point2D, vertices: &[Point2D], threshold: f64) -> Option<Point2D> {
    let mut best = None;
    let mut best_dist = threshold;
    for v in vertices {
        let dist = point.distance_to(v);
        if dist < best_dist {
            best_dist = dist;
            best = Some(*v);
        }
    }
    best
}

/// Priority 2: the projection onto the nearest wall strictly closer than `threshold`
pub fn nearest_wall_projection(point: &Point2D, walls: &[Segment], threshold: f64) -> Option<Point2D> {
    let mut best = None;
    let mut best_dist = threshold;
    for wall in walls {
        let dist = distance_to_segment(point, wall);
        if dist < best_dist {
            best_dist = dist;
            best = Some(project_point_on_segment(point, &wall.start, &wall.end));
        }
    }
    best
}

/// Resolve the snap for one stair endpoint, endpoint pass strictly first
pub fn snap_target(
    point: &Point2D,
    vertices: &[Point2D],
    walls: &[Segment],
    config: &StairSnapConfig,
) -> Option<SnapTarget> {
    if let Some(v) = nearest_wall_endpoint(point, vertices, config.endpoint_threshold) {
        return Some(SnapTarget::WallEndpoint(v));
    }
    nearest_wall_projection(point, walls, config.line_threshold).map(SnapTarget::WallLine)
}

/// Snap a stair set onto a wall set.
///
/// With no stairs or no walls the stairs are returned unchanged (and no
/// post-processing is applied).
pub fn snap_stairs_to_walls(stairs: &[Segment], walls: &[Segment], config: &StairSnapConfig) -> Vec<Segment> {
    if stairs.is_empty() || walls.is_empty() {
        return stairs.to_vec();
    }

    let vertices = wall_vertices(walls);
    let mut snapped = stairs.to_vec();
    let mut endpoint_snaps = 0usize;
    let mut line_snaps = 0usize;

    for (idx, stair) in snapped.iter_mut().enumerate() {
        for end in End::BOTH {
            let point = stair.point(end);
            let Some(target) = snap_target(&point, &vertices, walls, config) else {
                continue;
            };
            match target {
                SnapTarget::WallEndpoint(_) => endpoint_snaps += 1,
                SnapTarget::WallLine(_) => line_snaps += 1,
            }
            debug!(stair = idx, ?end, ?target, "snapped stair endpoint");
            stair.set_point(end, target.point().trunc());
        }
    }

    let straightened = straighten_segments(&snapped, config.straighten_tolerance);
    let deduplicated = merge_vertices(&straightened, config.vertex_merge_tolerance);
    let result = merge_onto_vertices(&deduplicated, &vertices, config.wall_merge_tolerance);

    info!(
        stairs = stairs.len(),
        walls = walls.len(),
        endpoint_snaps,
        line_snaps,
        "stair snapping complete"
    );

    result
}

/// Force nearly vertical/horizontal segments to be exact.
///
/// If `0 < |x1 - x2| <= tolerance` both x become their rounded average;
/// otherwise the same test is applied to y. The vertical test wins.
pub fn straighten_segments(segments: &[Segment], tolerance: f64) -> Vec<Segment> {
    segments
        .iter()
        .map(|seg| {
            let mut fixed = seg.clone();
            let adx = (seg.start.x - seg.end.x).abs();
            let ady = (seg.start.y - seg.end.y).abs();

            if adx > 0.0 && adx <= tolerance {
                let x = ((seg.start.x + seg.end.x) / 2.0).round_ties_even();
                fixed.start.x = x;
                fixed.end.x = x;
            } else if ady > 0.0 && ady <= tolerance {
                let y = ((seg.start.y + seg.end.y) / 2.0).round_ties_even();
                fixed.start.y = y;
                fixed.end.y = y;
            }
            fixed
        })
        .collect()
}

/// Replace every endpoint within `tolerance` of a vertex by the first such vertex
pub fn merge_onto_vertices(segments: &[Segment], vertices: &[Point2D], tolerance: f64) -> Vec<Segment> {
    let adopt = |p: Point2D| {
        vertices
            .iter()
            .find(|v| p.distance_to(v) <= tolerance)
            .copied()
            .unwrap_or(p)
    };

    segments
        .iter()
        .map(|seg| Segment {
            start: adopt(seg.start),
            end: adopt(seg.end),
            ..seg.clone()
        })
        .collect()
}
