// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Global grid alignment of near-axis segments.
//!
//! Vectorized walls that meet in the drawing rarely share exact coordinates:
//! a corridor wall may be traced at x=412 on one side of a doorway and x=415
//! on the other. This pass collects the coordinates of every near-vertical or
//! near-horizontal segment, chains them into clusters and snaps every
//! endpoint in a cluster's range onto the cluster's rounded mean.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{Point2D, Segment};

/// Configuration for grid alignment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Maximum gap between consecutive sorted coordinates that keeps them in
    /// the same cluster (pixels). Default: 20.0
    pub align_threshold: f64,

    /// A segment is a vertical candidate if |x1 - x2| is below this, else a
    /// horizontal candidate if |y1 - y2| is. Default: 15.0
    pub skew_tolerance: f64,

    /// Each rule's range extends this far past its cluster's extremes.
    /// Default: 2.0
    pub rule_margin: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            align_threshold: 20.0,
            skew_tolerance: 15.0,
            rule_margin: 2.0,
        }
    }
}

/// Snap any coordinate inside `[min, max]` onto `target`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRule {
    pub min: f64,
    pub max: f64,
    pub target: f64,
}

impl GridRule {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Independent rule sets for x and y coordinates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridRules {
    pub x: Vec<GridRule>,
    pub y: Vec<GridRule>,
}

impl GridRules {
    pub fn snap_x(&self, value: f64) -> f64 {
        snap_with(&self.x, value)
    }

    pub fn snap_y(&self, value: f64) -> f64 {
        snap_with(&self.y, value)
    }

    pub fn snap_point(&self, p: &Point2D) -> Point2D {
        Point2D::new(self.snap_x(p.x), self.snap_y(p.y))
    }
}

/// Every matching rule is applied in order, so with overlapping ranges the
/// last match wins.
fn snap_with(rules: &[GridRule], value: f64) -> f64 {
    let mut snapped = value;
    for rule in rules {
        if rule.contains(value) {
            snapped = rule.target;
        }
    }
    snapped
}

/// Build the x and y grid rules from the near-axis segments of a set.
///
/// Segments that are neither vertical nor horizontal candidates contribute
/// nothing. A candidate contributes both of its x coordinates to the x pool
/// and both y coordinates to the y pool.
pub fn build_grid_rules(segments: &[Segment], config: &GridConfig) -> GridRules {
    let mut x_coords = Vec::new();
    let mut y_coords = Vec::new();
    let mut skewed = 0usize;

    for seg in segments {
        let adx = (seg.start.x - seg.end.x).abs();
        let ady = (seg.start.y - seg.end.y).abs();

        let skew = if adx < config.skew_tolerance {
            adx
        } else if ady < config.skew_tolerance {
            ady
        } else {
            continue;
        };
        if skew > 0.0 {
            skewed += 1;
        }

        x_coords.extend([seg.start.x, seg.end.x]);
        y_coords.extend([seg.start.y, seg.end.y]);
    }

    let rules = GridRules {
        x: cluster_rules(&x_coords, config.align_threshold, config.rule_margin),
        y: cluster_rules(&y_coords, config.align_threshold, config.rule_margin),
    };

    debug!(
        skewed,
        x_rules = rules.x.len(),
        y_rules = rules.y.len(),
        "built grid rules"
    );

    rules
}

/// Chain-cluster a coordinate pool into grid rules.
///
/// Unique values are sorted and swept once; a value joins the current cluster
/// when its gap to the cluster's *last* member is within `threshold`
/// (single linkage, so a cluster can span far more than `threshold`).
pub fn cluster_rules(coords: &[f64], threshold: f64, margin: f64) -> Vec<GridRule> {
    let mut unique: Vec<f64> = coords.iter().copied().filter(|v| v.is_finite()).collect();
    unique.sort_by(|a, b| a.total_cmp(b));
    unique.dedup();

    let Some((&first, rest)) = unique.split_first() else {
        return Vec::new();
    };

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    let mut current = vec![first];

    for &value in rest {
        // `current` is never empty: it starts with one value and is replaced by a one-value vec
        let last = current[current.len() - 1];
        if value - last <= threshold {
            current.push(value);
        } else {
            clusters.push(std::mem::replace(&mut current, vec![value]));
        }
    }
    clusters.push(current);

    clusters
        .into_iter()
        .map(|cluster| {
            let mean = cluster.iter().sum::<f64>() / cluster.len() as f64;
            GridRule {
                min: cluster[0] - margin,
                max: cluster[cluster.len() - 1] + margin,
                target: mean.round_ties_even(),
            }
        })
        .collect()
}

/// Align a segment set onto its shared coordinate grid.
///
/// Returns a new list of the same length and order; the input is untouched.
/// Each endpoint coordinate is tested against the rules using its original
/// value, so both endpoints of a segment snap independently.
pub fn align_to_grid(segments: &[Segment], config: &GridConfig) -> Vec<Segment> {
    if segments.is_empty() {
        return Vec::new();
    }

    let rules = build_grid_rules(segments, config);
    let aligned = apply_grid_rules(segments, &rules);

    let corrected = segments
        .iter()
        .zip(&aligned)
        .filter(|(before, after)| !before.coordinates_equal(after))
        .count();
    info!(
        segments = segments.len(),
        corrected,
        x_rules = rules.x.len(),
        y_rules = rules.y.len(),
        "grid alignment complete"
    );

    aligned
}

/// Apply prebuilt rules to every endpoint of every segment
pub fn apply_grid_rules(segments: &[Segment], rules: &GridRules) -> Vec<Segment> {
    segments
        .iter()
        .map(|seg| Segment {
            start: rules.snap_point(&seg.start),
            end: rules.snap_point(&seg.end),
            ..seg.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_rules_chain() {
        // 0 → 15 → 30 chain together even though 0 and 30 are 30 apart
        let rules = cluster_rules(&[0.0, 15.0, 30.0, 100.0, 104.0], 20.0, 2.0);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0], GridRule { min: -2.0, max: 32.0, target: 15.0 });
        assert_eq!(rules[1], GridRule { min: 98.0, max: 106.0, target: 102.0 });
    }

    #[test]
    fn test_cluster_rules_use_unique_values() {
        // Duplicates do not weight the mean
        let rules = cluster_rules(&[10.0, 10.0, 10.0, 13.0], 20.0, 2.0);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].target, 12.0); // round(11.5) = 12 (ties to even)
    }

    #[test]
    fn test_cluster_rules_empty() {
        assert!(cluster_rules(&[], 20.0, 2.0).is_empty());
    }

    #[test]
    fn test_align_snaps_near_axis_walls() {
        let walls = vec![
            Segment::wall(100.0, 0.0, 103.0, 200.0),
            Segment::wall(98.0, 200.0, 300.0, 205.0),
        ];

        let aligned = align_to_grid(&walls, &GridConfig::default());

        assert_eq!(aligned.len(), 2);
        // x pool {98, 100, 103, 300} → cluster {98,100,103} → target 100
        assert_eq!(aligned[0].start.x, 100.0);
        assert_eq!(aligned[0].end.x, 100.0);
        assert_eq!(aligned[1].start.x, 100.0);
        // y pool {0, 200, 205} → clusters {0}, {200,205} → 202
        assert_eq!(aligned[0].end.y, 202.0);
        assert_eq!(aligned[1].start.y, 202.0);
        assert_eq!(aligned[1].end.y, 202.0);
    }

    #[test]
    fn test_diagonal_segments_contribute_nothing() {
        let segments = vec![Segment::new(0.0, 0.0, 100.0, 100.0)];
        let rules = build_grid_rules(&segments, &GridConfig::default());
        assert!(rules.x.is_empty());
        assert!(rules.y.is_empty());

        let aligned = align_to_grid(&segments, &GridConfig::default());
        assert_eq!(aligned, segments);
    }

    #[test]
    fn test_non_candidates_are_still_snapped() {
        let segments = vec![
            Segment::new(50.0, 0.0, 52.0, 300.0),
            // Diagonal: contributes no coordinates, but its start lies in the x=51 rule
            Segment::new(49.0, 400.0, 250.0, 600.0),
        ];
        let aligned = align_to_grid(&segments, &GridConfig::default());
        assert_eq!(aligned[1].start.x, 51.0);
        assert_eq!(aligned[1].end, Point2D::new(250.0, 600.0));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let walls = vec![Segment::wall(100.0, 0.0, 103.0, 200.0)];
        let copy = walls.clone();
        let _ = align_to_grid(&walls, &GridConfig::default());
        assert_eq!(walls, copy);
    }
}
