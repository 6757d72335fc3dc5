// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entrance synthesis over a numbered, finalized segment set.
//!
//! Two construction modes:
//!
//! - **pair mode**: the entrance is the midpoint of two numbered points
//!   (typically the two jambs of a doorway);
//! - **ray mode**: starting at a numbered point, continue each wall that ends
//!   there straight past the point until its line crosses another segment's
//!   line; the entrance is the midpoint of the point and the closest crossing.
//!
//! Both modes produce an [`EntranceBatch`] numbered from 1. Batches are
//! combined with [`EntranceBatch::append`], which renumbers the appended
//! batch to continue after the receiving one.

use std::collections::BTreeMap;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geometry::{line_intersection, round_to};
use crate::points::PointMapping;
use crate::types::{Entrance, Point2D, PointId, Segment};

/// Decimal places kept on entrance coordinates
const ENTRANCE_DECIMALS: i32 = 1;

/// Configuration for ray-mode entrance synthesis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntranceConfig {
    /// Length of the probe ray (pixels). Default: 5000.0
    pub ray_length: f64,
    /// Line pairs with |determinant| below this are parallel. Default: 1e-10
    pub parallel_epsilon: f64,
    /// Crossings must lie strictly farther than this from the point. Default: 1.0
    pub min_hit_distance: f64,
}

impl Default for EntranceConfig {
    fn default() -> Self {
        Self {
            ray_length: 5000.0,
            parallel_epsilon: 1e-10,
            min_hit_distance: 1.0,
        }
    }
}

/// Two point IDs whose midpoint is an entrance.
///
/// Accepts `[a, b]` or `[a, b, stairs]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "PairRecord")]
pub struct EntrancePair {
    pub a: PointId,
    pub b: PointId,
    pub stairs: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PairRecord {
    Flagged(PointId, PointId, bool),
    Plain(PointId, PointId),
}

impl From<PairRecord> for EntrancePair {
    fn from(r: PairRecord) -> Self {
        match r {
            PairRecord::Flagged(a, b, stairs) => Self { a, b, stairs },
            PairRecord::Plain(a, b) => Self { a, b, stairs: false },
        }
    }
}

impl EntrancePair {
    pub fn new(a: PointId, b: PointId) -> Self {
        Self { a, b, stairs: false }
    }

    pub fn stairs(a: PointId, b: PointId) -> Self {
        Self { a, b, stairs: true }
    }
}

/// A point from which to cast entrance rays.
///
/// Accepts `id` or `[id, stairs]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "RayRecord")]
pub struct RayRequest {
    pub point: PointId,
    pub stairs: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RayRecord {
    Bare(PointId),
    Flagged(PointId, bool),
}

impl From<RayRecord> for RayRequest {
    fn from(r: RayRecord) -> Self {
        match r {
            RayRecord::Bare(point) => Self { point, stairs: false },
            RayRecord::Flagged(point, stairs) => Self { point, stairs },
        }
    }
}

impl RayRequest {
    pub fn new(point: PointId) -> Self {
        Self { point, stairs: false }
    }
}

/// Entrances numbered sequentially, with the next free ID carried alongside
#[derive(Debug, Clone, PartialEq)]
pub struct EntranceBatch {
    entrances: Vec<Entrance>,
    next_id: u32,
}

impl Default for EntranceBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl EntranceBatch {
    pub fn new() -> Self {
        Self {
            entrances: Vec::new(),
            next_id: 1,
        }
    }

    /// Add an entrance at `position` with the next ID
    pub fn push(&mut self, position: Point2D, stairs: bool) -> u32 {
        let id = self.next_id;
        self.entrances.push(Entrance::new(id, position, stairs));
        self.next_id += 1;
        id
    }

    /// Append another batch, offsetting its IDs by this batch's count
    pub fn append(&mut self, other: EntranceBatch) {
        let offset = self.entrances.len() as u32;
        let added = other.entrances.len() as u32;
        self.entrances.extend(other.entrances.into_iter().map(|mut e| {
            e.id += offset;
            e
        }));
        self.next_id += added;
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.entrances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrances.is_empty()
    }

    pub fn entrances(&self) -> &[Entrance] {
        &self.entrances
    }

    pub fn into_entrances(self) -> Vec<Entrance> {
        self.entrances
    }
}

/// Rounded midpoint used for every synthesized entrance
fn entrance_position(a: &Point2D, b: &Point2D) -> Point2D {
    let mid = a.midpoint(b);
    Point2D::new(round_to(mid.x, ENTRANCE_DECIMALS), round_to(mid.y, ENTRANCE_DECIMALS))
}

/// Pair mode: one entrance per pair whose two IDs are both mapped.
///
/// Unmapped pairs are skipped with a warning and consume no ID.
pub fn entrances_from_pairs(pairs: &[EntrancePair], mapping: &PointMapping) -> EntranceBatch {
    let mut batch = EntranceBatch::new();

    for pair in pairs {
        let (Some(a), Some(b)) = (mapping.get(pair.a), mapping.get(pair.b)) else {
            warn!(a = pair.a, b = pair.b, "point not found in mapping, skipping pair");
            continue;
        };
        let id = batch.push(entrance_position(&a, &b), pair.stairs);
        debug!(id, a = pair.a, b = pair.b, "entrance from pair");
    }

    info!(pairs = pairs.len(), entrances = batch.len(), "pair entrances created");
    batch
}

/// Ray mode: one entrance per requested point that has a valid crossing.
pub fn entrances_from_rays(
    requests: &[RayRequest],
    mapping: &PointMapping,
    segments: &[Segment],
    config: &EntranceConfig,
) -> EntranceBatch {
    let mut batch = EntranceBatch::new();

    for request in requests {
        let Some(point) = mapping.get(request.point) else {
            warn!(point = request.point, "point not found in mapping, skipping ray");
            continue;
        };

        match cast_entrance_ray(&point, segments, config) {
            Some(hit) => {
                let id = batch.push(entrance_position(&point, &hit), request.stairs);
                debug!(id, point = request.point, hit = ?(hit.x, hit.y), "entrance from ray");
            }
            None => debug!(point = request.point, "no crossing found for ray"),
        }
    }

    info!(requests = requests.len(), entrances = batch.len(), "ray entrances created");
    batch
}

/// Closest crossing of any ray continuing a segment past `point`.
///
/// For each segment with an endpoint exactly at `point`, the ray runs from
/// `point` away from the segment's other end. Its supporting line is
/// intersected with the supporting line of every other segment; crossings
/// within `min_hit_distance` of the point are ignored.
pub fn cast_entrance_ray(point: &Point2D, segments: &[Segment], config: &EntranceConfig) -> Option<Point2D> {
    let origin = point.to_nalgebra();
    let mut best: Option<(f64, Point2D)> = None;

    for (idx, seg) in segments.iter().enumerate() {
        let Some(end) = seg.end_at(point) else {
            continue;
        };
        let other = seg.point(end.opposite()).to_nalgebra();

        let Some(direction) = Vector2::new(origin.x - other.x, origin.y - other.y).try_normalize(0.0) else {
            continue;
        };
        let ray_end = Point2D::from_nalgebra(&(origin + direction * config.ray_length));

        for (other_idx, candidate) in segments.iter().enumerate() {
            if other_idx == idx {
                continue;
            }
            let Some(hit) = line_intersection(
                point,
                &ray_end,
                &candidate.start,
                &candidate.end,
                config.parallel_epsilon,
            ) else {
                continue;
            };

            let dist = point.distance_to(&hit);
            if dist > config.min_hit_distance && best.map_or(true, |(d, _)| dist < d) {
                best = Some((dist, hit));
            }
        }
    }

    best.map(|(_, hit)| hit)
}

/// Naming and availability for one entrance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntranceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub room_no: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

/// Copy details onto every entrance with an entry in `details`.
///
/// `name` and `room_no` are always overwritten (absent means null);
/// `available` only when given. Returns how many entrances were updated.
pub fn apply_entrance_details(entrances: &mut [Entrance], details: &BTreeMap<u32, EntranceDetails>) -> usize {
    let mut updated = 0;
    for entrance in entrances.iter_mut() {
        let Some(detail) = details.get(&entrance.id) else {
            continue;
        };
        entrance.name = detail.name.clone();
        entrance.room_no = detail.room_no.clone();
        if let Some(available) = detail.available {
            entrance.available = available;
        }
        updated += 1;
    }

    let named = entrances.iter().filter(|e| e.name.is_some()).count();
    info!(updated, named, total = entrances.len(), "entrance details applied");
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mapping(points: &[(PointId, f64, f64)]) -> PointMapping {
        let points: BTreeMap<_, _> = points.iter().map(|&(id, x, y)| (id, Point2D::new(x, y))).collect();
        PointMapping {
            total_points: points.len(),
            points,
        }
    }

    #[test]
    fn test_pair_midpoint() {
        let mapping = mapping(&[(0, 0.0, 0.0), (1, 10.0, 0.0)]);
        let batch = entrances_from_pairs(&[EntrancePair::new(0, 1)], &mapping);

        assert_eq!(batch.len(), 1);
        let door = &batch.entrances()[0];
        assert_eq!(door.id, 1);
        assert_eq!(door.position(), Point2D::new(5.0, 0.0));
        assert!(!door.stairs);
        assert!(door.available);
    }

    #[test]
    fn test_pair_midpoint_rounds_to_one_decimal() {
        let mapping = mapping(&[(0, 0.0, 0.0), (1, 3.0, 1.25)]);
        let batch = entrances_from_pairs(&[EntrancePair::stairs(0, 1)], &mapping);
        let door = &batch.entrances()[0];
        assert_relative_eq!(door.x, 1.5);
        assert_relative_eq!(door.y, 0.6);
        assert!(door.stairs);
    }

    #[test]
    fn test_missing_point_is_skipped() {
        let mapping = mapping(&[(0, 0.0, 0.0), (1, 10.0, 0.0), (2, 10.0, 10.0)]);
        let pairs = [EntrancePair::new(0, 99), EntrancePair::new(1, 2)];
        let batch = entrances_from_pairs(&pairs, &mapping);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.entrances()[0].id, 1);
        assert_eq!(batch.next_id(), 2);
    }

    #[test]
    fn test_ray_crosses_vertical_segment() {
        let segments = vec![
            Segment::wall(10.0, 0.0, 0.0, 0.0),
            Segment::wall(-20.0, -5.0, -20.0, 5.0),
        ];

        let hit = cast_entrance_ray(&Point2D::new(0.0, 0.0), &segments, &EntranceConfig::default()).unwrap();
        assert_relative_eq!(hit.x, -20.0);
        assert_relative_eq!(hit.y, 0.0);

        let mapping = mapping(&[(7, 0.0, 0.0)]);
        let batch = entrances_from_rays(&[RayRequest::new(7)], &mapping, &segments, &EntranceConfig::default());
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.entrances()[0].position(), Point2D::new(-10.0, 0.0));
    }

    #[test]
    fn test_ray_keeps_closest_crossing() {
        let segments = vec![
            Segment::wall(10.0, 0.0, 0.0, 0.0),
            Segment::wall(-50.0, -5.0, -50.0, 5.0),
            Segment::wall(-30.0, -5.0, -30.0, 5.0),
        ];
        let hit = cast_entrance_ray(&Point2D::new(0.0, 0.0), &segments, &EntranceConfig::default()).unwrap();
        assert_relative_eq!(hit.x, -30.0);
    }

    #[test]
    fn test_ray_ignores_crossings_at_the_point() {
        // The second wall also passes through the point itself
        let segments = vec![
            Segment::wall(10.0, 0.0, 0.0, 0.0),
            Segment::wall(0.0, 0.0, 0.0, 40.0),
        ];
        assert!(cast_entrance_ray(&Point2D::new(0.0, 0.0), &segments, &EntranceConfig::default()).is_none());
    }

    #[test]
    fn test_ray_without_segments_produces_nothing() {
        let mapping = mapping(&[(0, 0.0, 0.0)]);
        let batch = entrances_from_rays(&[RayRequest::new(0)], &mapping, &[], &EntranceConfig::default());
        assert!(batch.is_empty());
    }

    #[test]
    fn test_append_offsets_by_count() {
        let mapping = mapping(&[(0, 0.0, 0.0), (1, 10.0, 0.0), (2, 20.0, 0.0)]);
        let mut pairs = entrances_from_pairs(&[EntrancePair::new(0, 1), EntrancePair::new(1, 2)], &mapping);
        let more = entrances_from_pairs(&[EntrancePair::new(0, 2)], &mapping);

        pairs.append(more);

        let ids: Vec<u32> = pairs.entrances().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(pairs.next_id(), 4);
    }

    #[test]
    fn test_request_wire_formats() {
        let pairs: Vec<EntrancePair> = serde_json::from_str("[[1, 2], [3, 4, true]]").unwrap();
        assert_eq!(pairs, vec![EntrancePair::new(1, 2), EntrancePair::stairs(3, 4)]);

        let rays: Vec<RayRequest> = serde_json::from_str("[5, [6, true]]").unwrap();
        assert_eq!(rays[0], RayRequest::new(5));
        assert!(rays[1].stairs);
    }

    #[test]
    fn test_apply_details() {
        let mut entrances = vec![
            Entrance::new(1, Point2D::new(0.0, 0.0), false),
            Entrance::new(2, Point2D::new(5.0, 0.0), false),
        ];
        let details: BTreeMap<u32, EntranceDetails> =
            serde_json::from_str(r#"{"2": {"name": "Lecture Hall", "room_no": "208", "available": false}}"#).unwrap();

        let updated = apply_entrance_details(&mut entrances, &details);

        assert_eq!(updated, 1);
        assert_eq!(entrances[0].name, None);
        assert_eq!(entrances[1].name.as_deref(), Some("Lecture Hall"));
        assert_eq!(entrances[1].room_no.as_deref(), Some("208"));
        assert!(!entrances[1].available);
    }
}
