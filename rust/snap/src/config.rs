// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration: JSON file, then `FLOORGRAPH_*` environment overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entrance::EntranceConfig;
use crate::error::{Error, Result};
use crate::extend::ExtendConfig;
use crate::grid_align::GridConfig;
use crate::io::read_json;
use crate::stair_snap::StairSnapConfig;
use crate::weld::WeldConfig;

/// Every tuning parameter of a floor run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub grid: GridConfig,
    pub extend: ExtendConfig,
    pub stairs: StairSnapConfig,
    pub weld: WeldConfig,
    pub entrances: EntranceConfig,
    /// Run junction welding on walls after self-correction
    pub weld_walls: bool,
}

fn env_or<T: std::str::FromStr>(name: &str, current: T) -> T {
    match std::env::var(name) {
        Ok(value) => value.parse().unwrap_or(current),
        Err(_) => current,
    }
}

impl PipelineConfig {
    /// Load from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FLOORGRAPH_*` environment variables over the current values.
    ///
    /// Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        self.grid.align_threshold = env_or("FLOORGRAPH_ALIGN_THRESHOLD", self.grid.align_threshold);
        self.grid.skew_tolerance = env_or("FLOORGRAPH_SKEW_TOLERANCE", self.grid.skew_tolerance);
        self.extend.snap_distance = env_or("FLOORGRAPH_SNAP_DISTANCE", self.extend.snap_distance);
        self.stairs.endpoint_threshold =
            env_or("FLOORGRAPH_ENDPOINT_THRESHOLD", self.stairs.endpoint_threshold);
        self.stairs.line_threshold = env_or("FLOORGRAPH_LINE_THRESHOLD", self.stairs.line_threshold);
        self.weld.endpoint_radius = env_or("FLOORGRAPH_WELD_ENDPOINT_RADIUS", self.weld.endpoint_radius);
        self.weld.line_radius = env_or("FLOORGRAPH_WELD_LINE_RADIUS", self.weld.line_radius);
        self.entrances.ray_length = env_or("FLOORGRAPH_RAY_LENGTH", self.entrances.ray_length);
        self.weld_walls = env_or("FLOORGRAPH_WELD_WALLS", self.weld_walls);
        self
    }

    /// Reject negative or non-finite thresholds
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("grid.align_threshold", self.grid.align_threshold),
            ("grid.skew_tolerance", self.grid.skew_tolerance),
            ("grid.rule_margin", self.grid.rule_margin),
            ("extend.snap_distance", self.extend.snap_distance),
            ("stairs.endpoint_threshold", self.stairs.endpoint_threshold),
            ("stairs.line_threshold", self.stairs.line_threshold),
            ("stairs.straighten_tolerance", self.stairs.straighten_tolerance),
            ("stairs.vertex_merge_tolerance", self.stairs.vertex_merge_tolerance),
            ("stairs.wall_merge_tolerance", self.stairs.wall_merge_tolerance),
            ("weld.endpoint_radius", self.weld.endpoint_radius),
            ("weld.line_radius", self.weld.line_radius),
            ("entrances.ray_length", self.entrances.ray_length),
            ("entrances.parallel_epsilon", self.entrances.parallel_epsilon),
            ("entrances.min_hit_distance", self.entrances.min_hit_distance),
        ];

        match values.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            Some((name, value)) => Err(Error::InvalidConfig(format!(
                "{name} must be a non-negative number, got {value}"
            ))),
            None => Ok(()),
        }
    }
}
