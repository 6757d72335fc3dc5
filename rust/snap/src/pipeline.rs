// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-call floor processing: raw walls and stairs in, combined set out.

use tracing::info;

use crate::config::PipelineConfig;
use crate::extend::extend_free_endpoints;
use crate::grid_align::align_to_grid;
use crate::stair_snap::snap_stairs_to_walls;
use crate::types::{Segment, SegmentKind};
use crate::wall_correct::correct_walls;
use crate::weld::weld_junctions;

/// Output of [`process_floor`]
#[derive(Debug, Clone)]
pub struct FloorResult {
    /// Corrected, axis-aligned walls
    pub walls: Vec<Segment>,
    /// Stairs snapped onto the walls
    pub stairs: Vec<Segment>,
    /// Walls followed by stairs, each tagged with its kind
    pub combined: Vec<Segment>,
    pub stats: FloorStats,
}

/// Diagnostics from one floor run
#[derive(Debug, Clone, Default)]
pub struct FloorStats {
    pub wall_count: usize,
    pub stair_count: usize,
    pub walls_aligned: usize,
    pub wall_endpoints_extended: usize,
    pub walls_corrected: usize,
    pub walls_welded: usize,
    pub stairs_aligned: usize,
    pub stair_endpoints_extended: usize,
    pub stairs_snapped: usize,
}

fn count_changed(before: &[Segment], after: &[Segment]) -> usize {
    before
        .iter()
        .zip(after)
        .filter(|(a, b)| !a.coordinates_equal(b))
        .count()
}

/// Concatenate walls then stairs, tagging each with its kind
pub fn combine(walls: &[Segment], stairs: &[Segment]) -> Vec<Segment> {
    let tagged = |segments: &[Segment], kind| -> Vec<Segment> {
        segments.iter().cloned().map(|s| s.with_kind(kind)).collect()
    };
    let mut combined = tagged(walls, SegmentKind::Wall);
    combined.extend(tagged(stairs, SegmentKind::Stair));
    combined
}

/// Run the full wall and stair pipeline for one floor.
///
/// Walls: align → extend → self-correct (→ weld when enabled).
/// Stairs: align → extend, then snap onto the finished walls.
pub fn process_floor(walls: &[Segment], stairs: &[Segment], config: &PipelineConfig) -> FloorResult {
    let mut stats = FloorStats {
        wall_count: walls.len(),
        stair_count: stairs.len(),
        ..Default::default()
    };

    // Walls
    let aligned = align_to_grid(walls, &config.grid);
    stats.walls_aligned = count_changed(walls, &aligned);

    let extended = extend_free_endpoints(&aligned, &config.extend);
    stats.wall_endpoints_extended = extended.modified;

    let corrected = correct_walls(&extended.segments);
    stats.walls_corrected = count_changed(&extended.segments, &corrected);

    let final_walls = if config.weld_walls {
        let welded = weld_junctions(&corrected, &config.weld);
        stats.walls_welded = count_changed(&corrected, &welded);
        welded
    } else {
        corrected
    };

    // Stairs
    let aligned_stairs = align_to_grid(stairs, &config.grid);
    stats.stairs_aligned = count_changed(stairs, &aligned_stairs);

    let extended_stairs = extend_free_endpoints(&aligned_stairs, &config.extend);
    stats.stair_endpoints_extended = extended_stairs.modified;

    let final_stairs = snap_stairs_to_walls(&extended_stairs.segments, &final_walls, &config.stairs);
    stats.stairs_snapped = count_changed(&extended_stairs.segments, &final_stairs);

    let combined = combine(&final_walls, &final_stairs);

    info!(
        walls = stats.wall_count,
        stairs = stats.stair_count,
        combined = combined.len(),
        "floor processed"
    );

    FloorResult {
        walls: final_walls,
        stairs: final_stairs,
        combined,
        stats,
    }
}
