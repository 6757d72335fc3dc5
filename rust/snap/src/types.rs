// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for floor plan segment normalization

use nalgebra::Point2;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Identifier assigned to a unique coordinate by point numbering
pub type PointId = u32;

/// Serialize a pixel coordinate as a JSON integer when it has no fractional part.
///
/// Every correction stage produces integral coordinates, and downstream
/// consumers expect `"x1": 120` rather than `"x1": 120.0`.
pub(crate) fn serialize_coord<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// A 2D point in image pixel space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    #[serde(serialize_with = "serialize_coord")]
    pub x: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point2D) -> Point2D {
        Point2D::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Truncate both coordinates toward zero
    pub fn trunc(&self) -> Point2D {
        Point2D::new(self.x.trunc(), self.y.trunc())
    }

    /// Exact hashable identity of this coordinate
    pub fn key(&self) -> PointKey {
        PointKey::from(*self)
    }
}

/// Exact, hashable identity of a coordinate pair.
///
/// Two endpoints are "the same" only when both coordinates are bit-identical
/// (with `-0.0` folded onto `0.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey(u64, u64);

impl From<Point2D> for PointKey {
    fn from(p: Point2D) -> Self {
        let norm = |v: f64| if v == 0.0 { 0.0f64 } else { v };
        PointKey(norm(p.x).to_bits(), norm(p.y).to_bits())
    }
}

/// Segment class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Wall,
    Stair,
}

/// One end of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum End {
    Start,
    End,
}

impl End {
    pub fn opposite(self) -> End {
        match self {
            End::Start => End::End,
            End::End => End::Start,
        }
    }

    /// Both ends in processing order (start before end)
    pub const BOTH: [End; 2] = [End::Start, End::End];
}

/// Reference to one end of one segment in a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointRef {
    pub segment: usize,
    pub end: End,
}

/// Dominant direction of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
    /// Equal |dx| and |dy| (including zero length)
    Diagonal,
}

impl Orientation {
    pub fn from_delta(dx: f64, dy: f64) -> Self {
        if dx.abs() < dy.abs() {
            Orientation::Vertical
        } else if dy.abs() < dx.abs() {
            Orientation::Horizontal
        } else {
            Orientation::Diagonal
        }
    }
}

/// Flat wire record: `{x1, y1, x2, y2, type?, ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SegmentRecord {
    #[serde(serialize_with = "serialize_coord")]
    x1: f64,
    #[serde(serialize_with = "serialize_coord")]
    y1: f64,
    #[serde(serialize_with = "serialize_coord")]
    x2: f64,
    #[serde(serialize_with = "serialize_coord")]
    y2: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<SegmentKind>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

/// A wall or stair centerline produced by the vectorizer.
///
/// Identity is positional: there is no segment ID. Any extra fields of the
/// input record are carried in `attributes` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SegmentRecord", into = "SegmentRecord")]
pub struct Segment {
    pub start: Point2D,
    pub end: Point2D,
    pub kind: Option<SegmentKind>,
    pub attributes: Map<String, Value>,
}

impl From<SegmentRecord> for Segment {
    fn from(r: SegmentRecord) -> Self {
        Self {
            start: Point2D::new(r.x1, r.y1),
            end: Point2D::new(r.x2, r.y2),
            kind: r.kind,
            attributes: r.attributes,
        }
    }
}

impl From<Segment> for SegmentRecord {
    fn from(s: Segment) -> Self {
        Self {
            x1: s.start.x,
            y1: s.start.y,
            x2: s.end.x,
            y2: s.end.y,
            kind: s.kind,
            attributes: s.attributes,
        }
    }
}

impl Segment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            start: Point2D::new(x1, y1),
            end: Point2D::new(x2, y2),
            kind: None,
            attributes: Map::new(),
        }
    }

    pub fn wall(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1, y1, x2, y2).with_kind(SegmentKind::Wall)
    }

    pub fn stair(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1, y1, x2, y2).with_kind(SegmentKind::Stair)
    }

    pub fn with_kind(mut self, kind: SegmentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn point(&self, end: End) -> Point2D {
        match end {
            End::Start => self.start,
            End::End => self.end,
        }
    }

    pub fn set_point(&mut self, end: End, p: Point2D) {
        match end {
            End::Start => self.start = p,
            End::End => self.end = p,
        }
    }

    pub fn dx(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn dy(&self) -> f64 {
        self.end.y - self.start.y
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// Zero-length segments carry no direction
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_delta(self.dx(), self.dy())
    }

    /// End at which this segment touches `p`, if any
    pub fn end_at(&self, p: &Point2D) -> Option<End> {
        if self.start == *p {
            Some(End::Start)
        } else if self.end == *p {
            Some(End::End)
        } else {
            None
        }
    }

    pub fn is_stair(&self) -> bool {
        self.kind == Some(SegmentKind::Stair)
    }

    pub fn coordinates_equal(&self, other: &Segment) -> bool {
        self.start == other.start && self.end == other.end
    }
}

/// A synthesized doorway or stair access point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entrance {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub room_no: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    /// Entrance sits on a staircase rather than a room doorway
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stairs: bool,
}

fn default_available() -> bool {
    true
}

impl Entrance {
    pub fn new(id: u32, position: Point2D, stairs: bool) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            name: None,
            room_no: None,
            available: true,
            stairs,
        }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// A labelled room located at the average of its four corner points
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub number: Option<u32>,
    pub name: Option<String>,
    pub point_ids: Vec<PointId>,
}
