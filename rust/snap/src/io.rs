// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON file boundary. Everything is written pretty-printed.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entrance::EntranceDetails;
use crate::error::{Error, Result};
use crate::points::PointMapping;
use crate::rooms::RoomSet;
use crate::types::{Entrance, Segment};

/// `{"entrances": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntranceFile {
    pub entrances: Vec<Entrance>,
}

pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "read json");
    Ok(value)
}

pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.write_all(b"\n").map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    debug!(path = %path.display(), "wrote json");
    Ok(())
}

/// A flat list of segment records
pub fn read_segments(path: impl AsRef<Path>) -> Result<Vec<Segment>> {
    read_json(path)
}

pub fn write_segments(path: impl AsRef<Path>, segments: &[Segment]) -> Result<()> {
    write_json(path, segments)
}

pub fn read_point_mapping(path: impl AsRef<Path>) -> Result<PointMapping> {
    read_json(path)
}

pub fn write_point_mapping(path: impl AsRef<Path>, mapping: &PointMapping) -> Result<()> {
    write_json(path, mapping)
}

pub fn read_entrances(path: impl AsRef<Path>) -> Result<Vec<Entrance>> {
    read_json::<EntranceFile>(path).map(|f| f.entrances)
}

pub fn write_entrances(path: impl AsRef<Path>, entrances: &[Entrance]) -> Result<()> {
    write_json(
        path,
        &EntranceFile {
            entrances: entrances.to_vec(),
        },
    )
}

/// Entrance details keyed by entrance ID (`{"<id>": {...}}`)
pub fn read_entrance_details(path: impl AsRef<Path>) -> Result<BTreeMap<u32, EntranceDetails>> {
    read_json(path)
}

pub fn write_rooms(path: impl AsRef<Path>, rooms: &RoomSet) -> Result<()> {
    write_json(path, rooms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point2D;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("floorgraph-io-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_segments_file_roundtrip() {
        let path = scratch("segments.json");
        let segments = vec![Segment::wall(0.0, 0.0, 100.0, 0.0), Segment::stair(5.0, 5.0, 5.0, 40.0)];

        write_segments(&path, &segments).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"x2\": 100"));
        assert_eq!(read_segments(&path).unwrap(), segments);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_entrances_file_shape() {
        let path = scratch("entrances.json");
        write_entrances(&path, &[Entrance::new(1, Point2D::new(5.0, 0.0), true)]).unwrap();

        let value: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(value["entrances"][0]["stairs"], serde_json::Value::Bool(true));
        assert_eq!(read_entrances(&path).unwrap().len(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_segments(scratch("does-not-exist.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_bad_json_is_json_error() {
        let path = scratch("bad.json");
        std::fs::write(&path, "[{\"x1\": 1}]").unwrap();
        assert!(matches!(read_segments(&path), Err(Error::Json { .. })));
        std::fs::remove_file(&path).ok();
    }
}
