// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Junction welding for wall sets.
//!
//! An optional cleanup after self-correction. Phase 1 welds clusters of
//! nearby endpoints onto their rounded average. Phase 2 pulls each endpoint
//! onto the nearest wall it does not belong to.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::extend::EndpointUsage;
use crate::geometry::{distance_to_segment, project_point_on_segment};
use crate::stair_snap::wall_vertices;
use crate::types::{Point2D, PointKey, Segment};

/// Configuration for junction welding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeldConfig {
    /// Endpoints within this distance of a seed endpoint are welded (inclusive).
    /// Default: 30.0
    pub endpoint_radius: f64,
    /// Endpoints strictly closer than this to a foreign wall snap onto it.
    /// Default: 15.0
    pub line_radius: f64,
}

impl Default for WeldConfig {
    fn default() -> Self {
        Self {
            endpoint_radius: 30.0,
            line_radius: 15.0,
        }
    }
}

/// Weld wall junctions. Output coordinates are truncated to integers.
pub fn weld_junctions(walls: &[Segment], config: &WeldConfig) -> Vec<Segment> {
    if walls.is_empty() {
        return Vec::new();
    }

    let unique = wall_vertices(walls);
    let usage = EndpointUsage::build(walls);

    // Phase 1: seed-based grouping, each endpoint joins at most one group
    let mut welded: FxHashMap<PointKey, Point2D> = FxHashMap::default();
    let mut groups = 0usize;
    for (i, seed) in unique.iter().enumerate() {
        if welded.contains_key(&seed.key()) {
            continue;
        }
        let mut group = vec![*seed];
        group.extend(
            unique[i + 1..]
                .iter()
                .filter(|p| !welded.contains_key(&p.key()) && seed.distance_to(p) <= config.endpoint_radius),
        );
        if group.len() < 2 {
            continue;
        }

        let n = group.len() as f64;
        let avg = Point2D::new(
            (group.iter().map(|p| p.x).sum::<f64>() / n).round_ties_even(),
            (group.iter().map(|p| p.y).sum::<f64>() / n).round_ties_even(),
        );
        for p in &group {
            welded.insert(p.key(), avg);
        }
        groups += 1;
        debug!(members = group.len(), to = ?(avg.x, avg.y), "welded endpoints");
    }

    // Phase 2: project onto the nearest wall the endpoint is not part of
    let mut corrected: FxHashMap<PointKey, Point2D> = FxHashMap::default();
    let mut line_snaps = 0usize;
    for endpoint in &unique {
        let merged = welded.get(&endpoint.key()).copied().unwrap_or(*endpoint);
        let own: FxHashSet<usize> = usage.refs(endpoint).iter().map(|r| r.segment).collect();

        let mut best = merged;
        let mut best_dist = config.line_radius;
        for (idx, wall) in walls.iter().enumerate() {
            if own.contains(&idx) {
                continue;
            }
            let dist = distance_to_segment(&merged, wall);
            if dist < best_dist {
                best_dist = dist;
                best = project_point_on_segment(&merged, &wall.start, &wall.end);
            }
        }
        if best != merged {
            line_snaps += 1;
        }
        corrected.insert(endpoint.key(), best);
    }

    let resolve = |p: &Point2D| corrected.get(&p.key()).copied().unwrap_or(*p).trunc();
    let result: Vec<Segment> = walls
        .iter()
        .map(|w| Segment {
            start: resolve(&w.start),
            end: resolve(&w.end),
            ..w.clone()
        })
        .collect();

    let fixed = walls
        .iter()
        .zip(&result)
        .filter(|(a, b)| !a.coordinates_equal(b))
        .count();
    info!(walls = walls.len(), groups, line_snaps, fixed, "junction welding complete");

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_endpoints_weld_to_average() {
        let walls = vec![
            Segment::wall(0.0, 0.0, 100.0, 0.0),
            Segment::wall(104.0, 6.0, 104.0, 200.0),
        ];
        // Phase 2 disabled: only the endpoint weld is exercised here
        let config = WeldConfig {
            line_radius: 0.0,
            ..WeldConfig::default()
        };
        let welded = weld_junctions(&walls, &config);

        // (100,0) and (104,6) average to (102,3)
        assert_eq!(welded[0].end, Point2D::new(102.0, 3.0));
        assert_eq!(welded[1].start, Point2D::new(102.0, 3.0));
        assert_eq!(welded[0].start, Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_endpoint_snaps_onto_foreign_wall() {
        let walls = vec![
            Segment::wall(0.0, 0.0, 0.0, 300.0),
            // Ends 10px right of the vertical wall, far from its endpoints
            Segment::wall(10.0, 150.0, 200.0, 150.0),
        ];
        let welded = weld_junctions(&walls, &WeldConfig::default());
        assert_eq!(welded[1].start, Point2D::new(0.0, 150.0));
        assert_eq!(welded[0], walls[0]);
    }

    #[test]
    fn test_attributes_survive() {
        let mut wall = Segment::wall(0.0, 0.0, 100.0, 0.0);
        wall.attributes.insert("layer".into(), serde_json::Value::from("A-WALL"));
        let welded = weld_junctions(&[wall.clone()], &WeldConfig::default());
        assert_eq!(welded[0].attributes, wall.attributes);
    }
}
