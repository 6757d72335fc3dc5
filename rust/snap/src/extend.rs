// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Free endpoint extension.
//!
//! Vectorization leaves walls that stop a few pixels short of the wall they
//! should meet. An endpoint referenced by exactly one segment end is "free";
//! each free endpoint is moved onto the nearest other segment:
//!
//! - vertical segments keep their x and slide along y until they hit the
//!   target's infinite line (and horizontal segments the other way round),
//!   so axis alignment survives the extension;
//! - diagonal segments move to the nearest point of the target segment.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::geometry::{axis_line_intersection, distance_to_segment, project_point_on_segment, Axis};
use crate::types::{End, EndpointRef, Orientation, Point2D, PointKey, Segment};

/// Configuration for free endpoint extension
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendConfig {
    /// A free endpoint snaps only to a segment closer than this (pixels).
    /// Default: 50.0
    pub snap_distance: f64,
}

impl Default for ExtendConfig {
    fn default() -> Self {
        Self { snap_distance: 50.0 }
    }
}

/// How many segment ends reference each coordinate.
///
/// Coordinates are kept in first-seen order (segment order, start before
/// end) so that iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct EndpointUsage {
    order: Vec<PointKey>,
    refs: FxHashMap<PointKey, SmallVec<[EndpointRef; 2]>>,
}

impl EndpointUsage {
    pub fn build(segments: &[Segment]) -> Self {
        let mut usage = Self::default();
        for (segment, seg) in segments.iter().enumerate() {
            for end in End::BOTH {
                let key = seg.point(end).key();
                let entry = usage.refs.entry(key).or_insert_with(|| {
                    usage.order.push(key);
                    SmallVec::new()
                });
                entry.push(EndpointRef { segment, end });
            }
        }
        usage
    }

    /// Number of distinct coordinates
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of segment ends at `p`
    pub fn uses(&self, p: &Point2D) -> usize {
        self.refs.get(&p.key()).map_or(0, |r| r.len())
    }

    pub fn refs(&self, p: &Point2D) -> &[EndpointRef] {
        self.refs.get(&p.key()).map_or(&[], |r| r.as_slice())
    }

    /// Segment ends whose coordinate no other segment end shares
    pub fn free_endpoints(&self) -> impl Iterator<Item = EndpointRef> + '_ {
        self.order.iter().filter_map(|key| match self.refs[key].as_slice() {
            [only] => Some(*only),
            _ => None,
        })
    }
}

/// Result of an extension pass
#[derive(Debug, Clone)]
pub struct ExtendResult {
    pub segments: Vec<Segment>,
    /// Number of free endpoints that actually moved
    pub modified: usize,
}

/// Extend every free endpoint onto its nearest neighbouring segment.
///
/// Endpoint usage is computed once from the input. Free endpoints are then
/// processed in first-seen order against the working copy, so a segment
/// already extended is seen at its new position by later searches.
pub fn extend_free_endpoints(segments: &[Segment], config: &ExtendConfig) -> ExtendResult {
    let mut lines = segments.to_vec();
    if lines.is_empty() {
        return ExtendResult { segments: lines, modified: 0 };
    }

    let usage = EndpointUsage::build(segments);
    let free: Vec<EndpointRef> = usage.free_endpoints().collect();

    let mut modified = 0;
    for endpoint in &free {
        let line = &lines[endpoint.segment];
        let point = line.point(endpoint.end);
        let other = line.point(endpoint.end.opposite());
        let orientation = Orientation::from_delta(other.x - point.x, other.y - point.y);

        let Some(target) = nearest_segment(&lines, endpoint.segment, &point, config.snap_distance)
        else {
            continue;
        };
        let target = &lines[target];

        let new_point = match orientation {
            Orientation::Vertical => axis_line_intersection(&target.start, &target.end, &point, Axis::X),
            Orientation::Horizontal => axis_line_intersection(&target.start, &target.end, &point, Axis::Y),
            Orientation::Diagonal => {
                Some(project_point_on_segment(&point, &target.start, &target.end).trunc())
            }
        };

        // Parallel target: no crossing along our axis, leave the point alone
        let Some(new_point) = new_point else {
            debug!(segment = endpoint.segment, ?orientation, "target parallel, endpoint unmoved");
            continue;
        };

        if new_point != point {
            debug!(
                segment = endpoint.segment,
                ?orientation,
                from = ?(point.x, point.y),
                to = ?(new_point.x, new_point.y),
                "extended endpoint"
            );
            lines[endpoint.segment].set_point(endpoint.end, new_point);
            modified += 1;
        }
    }

    info!(
        endpoints = usage.len(),
        free = free.len(),
        modified,
        "endpoint extension complete"
    );

    ExtendResult { segments: lines, modified }
}

/// Index of the non-degenerate segment (other than `skip`) closest to
/// `point`, if strictly closer than `max_distance`. Ties keep the earlier one.
fn nearest_segment(lines: &[Segment], skip: usize, point: &Point2D, max_distance: f64) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_dist = max_distance;

    for (idx, other) in lines.iter().enumerate() {
        if idx == skip || other.is_degenerate() {
            continue;
        }
        let dist = distance_to_segment(point, other);
        if dist < best_dist {
            best_dist = dist;
            best = Some(idx);
        }
    }

    best
}
