// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Greedy merging of near-duplicate vertices.
//!
//! Endpoints are visited in segment order (start before end). Each new
//! coordinate adopts the *first* canonical vertex within tolerance, or
//! becomes canonical itself. The result is order-dependent when tolerance
//! neighbourhoods chain.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::types::{End, Point2D, PointKey, Segment};

/// Mapping from every seen coordinate to its canonical vertex
#[derive(Debug, Clone, Default)]
pub struct VertexMap {
    canonical: Vec<Point2D>,
    mapping: FxHashMap<PointKey, Point2D>,
}

impl VertexMap {
    pub fn build(segments: &[Segment], tolerance: f64) -> Self {
        let mut map = Self::default();
        for seg in segments {
            for end in End::BOTH {
                map.insert(seg.point(end), tolerance);
            }
        }
        map
    }

    /// Register `p`, returning the canonical vertex it maps to
    pub fn insert(&mut self, p: Point2D, tolerance: f64) -> Point2D {
        let key = p.key();
        if let Some(existing) = self.mapping.get(&key) {
            return *existing;
        }

        let target = match self.canonical.iter().find(|c| c.distance_to(&p) <= tolerance) {
            Some(c) => *c,
            None => {
                self.canonical.push(p);
                p
            }
        };

        self.mapping.insert(key, target);
        target
    }

    /// Canonical vertex for `p` (itself if never registered)
    pub fn resolve(&self, p: &Point2D) -> Point2D {
        self.mapping.get(&p.key()).copied().unwrap_or(*p)
    }

    /// Canonical vertices in registration order
    pub fn canonical(&self) -> &[Point2D] {
        &self.canonical
    }
}

/// Merge near-duplicate vertices across a segment list.
///
/// Returns a new list; the input is untouched.
pub fn merge_vertices(segments: &[Segment], tolerance: f64) -> Vec<Segment> {
    let map = VertexMap::build(segments, tolerance);

    let mut merged_segments = 0usize;
    let merged = segments
        .iter()
        .map(|seg| {
            let start = map.resolve(&seg.start);
            let end = map.resolve(&seg.end);
            if start != seg.start || end != seg.end {
                merged_segments += 1;
            }
            Segment {
                start,
                end,
                ..seg.clone()
            }
        })
        .collect();

    debug!(
        segments = segments.len(),
        canonical = map.canonical().len(),
        merged_segments,
        "vertex merge complete"
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_within_tolerance() {
        let segments = vec![
            Segment::stair(0.0, 0.0, 100.0, 0.0),
            Segment::stair(101.0, 1.0, 101.0, 80.0),
        ];

        let merged = merge_vertices(&segments, 2.0);

        assert_eq!(merged[1].start, Point2D::new(100.0, 0.0));
        assert_eq!(merged[1].end, Point2D::new(101.0, 80.0));
        assert_eq!(merged[0], segments[0]);
    }

    #[test]
    fn test_first_match_not_nearest() {
        let segments = vec![
            Segment::new(0.0, 0.0, 3.0, 0.0),
            // (1.5, 0) is within 2 of both canonical vertices; the first wins
            Segment::new(1.5, 0.0, 50.0, 50.0),
        ];

        let merged = merge_vertices(&segments, 2.0);
        assert_eq!(merged[1].start, Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_order_dependence() {
        let a = Segment::new(0.0, 0.0, 100.0, 100.0);
        let b = Segment::new(2.0, 0.0, 200.0, 200.0);
        let c = Segment::new(4.0, 0.0, 300.0, 300.0);

        // a first: 2→0, then 4 is 4 away from 0 so it stays
        let forward = merge_vertices(&[a.clone(), b.clone(), c.clone()], 2.0);
        assert_eq!(forward[1].start.x, 0.0);
        assert_eq!(forward[2].start.x, 4.0);

        // b first: both 0 and 4 collapse onto 2
        let reordered = merge_vertices(&[b, a, c], 2.0);
        assert_eq!(reordered[1].start.x, 2.0);
        assert_eq!(reordered[2].start.x, 2.0);
    }

    #[test]
    fn test_canonical_vertices_are_separated() {
        let segments = vec![
            Segment::new(0.0, 0.0, 1.0, 1.0),
            Segment::new(2.0, 2.0, 3.0, 0.0),
            Segment::new(5.0, 5.0, 0.5, 0.0),
        ];
        let map = VertexMap::build(&segments, 2.0);
        let canonical = map.canonical();
        for (i, a) in canonical.iter().enumerate() {
            for b in &canonical[i + 1..] {
                assert!(a.distance_to(b) > 2.0);
            }
        }
    }
}
