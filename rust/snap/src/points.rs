// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-ID mapping: `{"total_points": N, "points": {"<id>": {"x", "y"}}}`

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{Point2D, PointId, PointKey, Segment};

/// Stable numeric identifiers for the unique coordinates of a floor.
///
/// Keys are decimal strings on the wire; serde_json converts them to and
/// from `PointId`, which also keeps the map in numeric order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointMapping {
    pub total_points: usize,
    pub points: BTreeMap<PointId, Point2D>,
}

impl PointMapping {
    /// Number every unique coordinate of a segment list, starting at 0, in
    /// segment order with start before end.
    pub fn from_segments(segments: &[Segment]) -> Self {
        let mut seen = FxHashSet::<PointKey>::default();
        let mut points = BTreeMap::new();
        let mut next: PointId = 0;

        for p in segments.iter().flat_map(|s| [s.start, s.end]) {
            if seen.insert(p.key()) {
                points.insert(next, p);
                next += 1;
            }
        }

        info!(segments = segments.len(), points = points.len(), "numbered points");
        Self {
            total_points: points.len(),
            points,
        }
    }

    pub fn get(&self, id: PointId) -> Option<Point2D> {
        self.points.get(&id).copied()
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.points.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// ID of the point at exactly `p`, if numbered
    pub fn find(&self, p: &Point2D) -> Option<PointId> {
        self.points.iter().find(|(_, q)| *q == p).map(|(id, _)| *id)
    }
}
