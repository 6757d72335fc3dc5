// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan segment normalization and snapping
//!
//! Takes the wall and stair centerlines produced by a raster vectorizer and
//! turns them into a clean, connected segment set:
//! 1. Grid alignment of near-axis coordinates
//! 2. Extension of free endpoints onto neighbouring segments
//! 3. Wall self-correction onto the dominant axis
//! 4. Stair-to-wall snapping with vertex merging
//! 5. Entrance synthesis over a numbered point set
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorgraph_snap::{process_floor, PipelineConfig, PointMapping};
//!
//! let result = process_floor(&walls, &stairs, &PipelineConfig::default());
//! let mapping = PointMapping::from_segments(&result.combined);
//! ```
//!
//! Every stage takes its input by reference and returns a new collection.

pub mod config;
pub mod entrance;
pub mod error;
pub mod extend;
pub mod geometry;
pub mod grid_align;
pub mod io;
pub mod pipeline;
pub mod points;
pub mod rooms;
pub mod stair_snap;
pub mod types;
pub mod vertex_merge;
pub mod wall_correct;
pub mod weld;

// Re-export commonly used types and functions
pub use config::PipelineConfig;
pub use entrance::{
    apply_entrance_details, cast_entrance_ray, entrances_from_pairs, entrances_from_rays, EntranceBatch,
    EntranceConfig, EntranceDetails, EntrancePair, RayRequest,
};
pub use error::{Error, Result};
pub use extend::{extend_free_endpoints, EndpointUsage, ExtendConfig, ExtendResult};
pub use grid_align::{align_to_grid, build_grid_rules, GridConfig, GridRule, GridRules};
pub use pipeline::{combine, process_floor, FloorResult, FloorStats};
pub use points::PointMapping;
pub use rooms::{build_rooms, parse_room_name, RoomDefinition, RoomSet};
pub use stair_snap::{snap_stairs_to_walls, StairSnapConfig};
pub use types::{End, Entrance, Orientation, Point2D, PointId, Room, Segment, SegmentKind};
pub use vertex_merge::{merge_vertices, VertexMap};
pub use wall_correct::{correct_wall, correct_walls};
pub use weld::{weld_junctions, WeldConfig};
