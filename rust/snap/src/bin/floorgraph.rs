// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: normalize vectorized floor plan segments and derive entrances
//!
//! Usage:
//!   floorgraph process --walls walls.json --stairs stairs.json -o combined.json
//!   floorgraph number combined.json -o points.json
//!   floorgraph entrances --mapping points.json --segments combined.json --request doors.json -o entrances.json

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;

use floorgraph_snap::io::{
    read_json, read_point_mapping, read_segments, write_entrances, write_point_mapping, write_rooms,
    write_segments,
};
use floorgraph_snap::{
    align_to_grid, apply_entrance_details, build_rooms, correct_walls, entrances_from_pairs, entrances_from_rays,
    extend_free_endpoints, merge_vertices, process_floor, snap_stairs_to_walls, weld_junctions, EntranceDetails,
    EntrancePair, PipelineConfig, PointMapping, RayRequest, RoomDefinition,
};

#[derive(Parser)]
#[command(name = "floorgraph")]
#[command(about = "Normalize and snap floor plan wall/stair segments")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with pipeline thresholds (missing fields keep defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every individual correction
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Snap near-axis coordinates onto a shared grid
    Align {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Extend free endpoints onto neighbouring segments
    Extend {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Force every wall onto its dominant axis
    Correct {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Weld nearby wall junctions together
    Weld {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Run the full wall and stair pipeline for one floor
    Process {
        #[arg(long)]
        walls: PathBuf,
        #[arg(long)]
        stairs: PathBuf,
        /// Combined wall+stair output
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        walls_out: Option<PathBuf>,
        #[arg(long)]
        stairs_out: Option<PathBuf>,
    },
    /// Snap stairs onto an already corrected wall set
    Snap {
        #[arg(long)]
        walls: PathBuf,
        #[arg(long)]
        stairs: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Merge near-duplicate vertices
    Merge {
        input: PathBuf,
        #[arg(long, default_value_t = 2.0)]
        tolerance: f64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Assign point IDs to the unique coordinates of a segment file
    Number {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Synthesize entrances from point pairs and rays
    Entrances {
        #[arg(long)]
        mapping: PathBuf,
        /// Combined segment file, required for ray requests
        #[arg(long)]
        segments: Option<PathBuf>,
        #[arg(long)]
        request: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Build labelled rooms from four-point definitions
    Rooms {
        #[arg(long)]
        mapping: PathBuf,
        #[arg(long)]
        rooms: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// `{"pairs": [[a, b] | [a, b, true]], "points": [id | [id, true]], "details": {"<id>": {...}}}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EntranceRequest {
    pairs: Vec<EntrancePair>,
    points: Vec<RayRequest>,
    details: BTreeMap<u32, EntranceDetails>,
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()))
        .init();

    let config = load_config(args.config.as_ref())?;

    match args.command {
        Commands::Align { input, output } => {
            let segments = read_segments(&input)?;
            write_segments(&output, &align_to_grid(&segments, &config.grid))?;
        }
        Commands::Extend { input, output } => {
            let segments = read_segments(&input)?;
            let result = extend_free_endpoints(&segments, &config.extend);
            write_segments(&output, &result.segments)?;
        }
        Commands::Correct { input, output } => {
            let segments = read_segments(&input)?;
            write_segments(&output, &correct_walls(&segments))?;
        }
        Commands::Weld { input, output } => {
            let segments = read_segments(&input)?;
            write_segments(&output, &weld_junctions(&segments, &config.weld))?;
        }
        Commands::Process {
            walls,
            stairs,
            output,
            walls_out,
            stairs_out,
        } => {
            let walls = read_segments(&walls)?;
            let stairs = read_segments(&stairs)?;
            let result = process_floor(&walls, &stairs, &config);

            write_segments(&output, &result.combined)?;
            if let Some(path) = walls_out {
                write_segments(&path, &result.walls)?;
            }
            if let Some(path) = stairs_out {
                write_segments(&path, &result.stairs)?;
            }
            info!(stats = ?result.stats, output = %output.display(), "saved combined floor");
        }
        Commands::Snap { walls, stairs, output } => {
            let walls = read_segments(&walls)?;
            let stairs = read_segments(&stairs)?;
            write_segments(&output, &snap_stairs_to_walls(&stairs, &walls, &config.stairs))?;
        }
        Commands::Merge {
            input,
            tolerance,
            output,
        } => {
            let segments = read_segments(&input)?;
            write_segments(&output, &merge_vertices(&segments, tolerance))?;
        }
        Commands::Number { input, output } => {
            let segments = read_segments(&input)?;
            let mapping = PointMapping::from_segments(&segments);
            write_point_mapping(&output, &mapping)?;
            info!(points = mapping.total_points, output = %output.display(), "saved point mapping");
        }
        Commands::Entrances {
            mapping,
            segments,
            request,
            output,
        } => {
            let mapping = read_point_mapping(&mapping)?;
            let request: EntranceRequest = read_json(&request)?;

            let mut batch = entrances_from_pairs(&request.pairs, &mapping);
            if !request.points.is_empty() {
                let path = segments.context("ray requests need --segments")?;
                let segments = read_segments(&path)?;
                batch.append(entrances_from_rays(
                    &request.points,
                    &mapping,
                    &segments,
                    &config.entrances,
                ));
            }

            let mut entrances = batch.into_entrances();
            apply_entrance_details(&mut entrances, &request.details);
            write_entrances(&output, &entrances)?;
            info!(entrances = entrances.len(), output = %output.display(), "saved entrances");
        }
        Commands::Rooms { mapping, rooms, output } => {
            let mapping = read_point_mapping(&mapping)?;
            let definitions: Vec<RoomDefinition> = read_json(&rooms)?;
            let set = build_rooms(&definitions, &mapping);
            write_rooms(&output, &set)?;
            info!(rooms = set.total_rooms, output = %output.display(), "saved rooms");
        }
    }

    Ok(())
}
