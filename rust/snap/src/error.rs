// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for floor file handling.
//!
//! The geometry stages never fail; only loading and saving do.

use std::path::PathBuf;

use crate::types::PointId;

/// Result type alias for floorgraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing floor data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file could not be opened, read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file was not valid JSON for the expected shape.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A point ID is not present in the point mapping.
    #[error("point {0} not found in mapping")]
    MissingPoint(PointId),

    /// A room definition could not be turned into a room.
    #[error("malformed room {room}: {reason}")]
    MalformedRoom { room: usize, reason: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
