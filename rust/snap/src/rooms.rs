// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room labelling from four numbered corner points.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::points::PointMapping;
use crate::types::{Point2D, PointId, Room};

/// Corners per room definition
const ROOM_CORNERS: usize = 4;

/// A room as written by hand: `[a, b, c, d]` or `{"point_ids": [...], "name": "114: Gents Toilet"}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RoomDefinition {
    Points(Vec<PointId>),
    Named {
        #[serde(default)]
        point_ids: Vec<PointId>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl RoomDefinition {
    pub fn point_ids(&self) -> &[PointId] {
        match self {
            RoomDefinition::Points(ids) | RoomDefinition::Named { point_ids: ids, .. } => ids,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            RoomDefinition::Points(_) => None,
            RoomDefinition::Named { name, .. } => name.as_deref(),
        }
    }
}

/// `{"total_rooms": N, "rooms": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomSet {
    pub total_rooms: usize,
    pub rooms: Vec<Room>,
}

/// Split `"114: Gents Toilet"` into `(Some(114), Some("Gents Toilet"))`.
///
/// Anything not starting with an integer before the first colon is a plain
/// name. Blank input has neither.
pub fn parse_room_name(full_name: &str) -> (Option<u32>, Option<String>) {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return (None, None);
    }

    if let Some((number, name)) = full_name.split_once(':') {
        if let Ok(number) = number.trim().parse::<u32>() {
            return (Some(number), Some(name.trim().to_string()));
        }
    }
    (None, Some(full_name.to_string()))
}

/// Build one room; `id` is the definition's 1-based position.
pub fn build_room(id: u32, definition: &RoomDefinition, mapping: &PointMapping) -> Result<Room> {
    let ids = definition.point_ids();
    if ids.len() != ROOM_CORNERS {
        return Err(Error::MalformedRoom {
            room: id as usize,
            reason: format!("expected {ROOM_CORNERS} points, got {}", ids.len()),
        });
    }

    let corners = ids
        .iter()
        .map(|&pid| mapping.get(pid).ok_or(Error::MissingPoint(pid)))
        .collect::<Result<Vec<Point2D>>>()?;

    let n = corners.len() as f64;
    let x = corners.iter().map(|p| p.x).sum::<f64>() / n;
    let y = corners.iter().map(|p| p.y).sum::<f64>() / n;
    let (number, name) = definition.name().map_or((None, None), parse_room_name);

    Ok(Room {
        id,
        x,
        y,
        number,
        name,
        point_ids: ids.to_vec(),
    })
}

/// Build every well-formed room; malformed definitions are skipped with a warning.
pub fn build_rooms(definitions: &[RoomDefinition], mapping: &PointMapping) -> RoomSet {
    let rooms: Vec<Room> = definitions
        .iter()
        .enumerate()
        .filter_map(|(idx, def)| match build_room(idx as u32 + 1, def, mapping) {
            Ok(room) => Some(room),
            Err(e) => {
                warn!(room = idx + 1, error = %e, "skipping room");
                None
            }
        })
        .collect();

    info!(definitions = definitions.len(), rooms = rooms.len(), "rooms built");
    RoomSet {
        total_rooms: rooms.len(),
        rooms,
    }
}
