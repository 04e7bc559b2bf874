//! Line-delimited snapshot of fetch results, and the sources that turn
//! either a live fetch or a stored snapshot into per-hotel availability.

use crate::{
    error::{AvailabilityError, Result},
    normalize::{HotelAvailability, normalize},
};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Anything that can produce the per-hotel availability map the grid builder
/// consumes. Implemented by the snapshot replay here and by the live fetcher.
pub trait AvailabilitySource {
    type Error;

    fn load(&mut self) -> std::result::Result<HotelAvailability, Self::Error>;
}

/// Outcome of one hotel's search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    Response(Value),
    Error(String),
}

/// One snapshot line: `{"hotel_id": .., "response": {..}}` or
/// `{"hotel_id": .., "error": ".."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRecord {
    pub hotel_id: String,
    #[serde(flatten)]
    pub outcome: FetchOutcome,
}

impl SnapshotRecord {
    pub fn response(hotel_id: impl Into<String>, response: Value) -> Self {
        Self {
            hotel_id: hotel_id.into(),
            outcome: FetchOutcome::Response(response),
        }
    }

    pub fn error(hotel_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hotel_id: hotel_id.into(),
            outcome: FetchOutcome::Error(message.into()),
        }
    }
}

/// Appends snapshot records to a JSONL file, one per line.
pub struct SnapshotWriter<W: Write = BufWriter<File>> {
    inner: W,
    written: usize,
}

impl SnapshotWriter {
    /// Create (truncate) the snapshot file, creating parent directories.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| AvailabilityError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        let file = File::create(path).map_err(|e| AvailabilityError::CreateFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn write(&mut self, record: &SnapshotRecord) -> Result<()> {
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Replays a stored snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AvailabilitySource for SnapshotSource {
    type Error = AvailabilityError;

    fn load(&mut self) -> Result<HotelAvailability> {
        let file = File::open(&self.path).map_err(|e| AvailabilityError::OpenFile {
            path: self.path.clone(),
            source: e,
        })?;
        load_from_reader(BufReader::new(file))
    }
}

/// Rebuild the availability map from a JSONL record stream.
///
/// Blank, malformed (including non-UTF-8) and id-less lines are skipped. When
/// a hotel ID appears more than once, the later record replaces the earlier
/// one. Error records keep the hotel with empty availability. Only read
/// failures of the underlying stream are returned as errors.
pub fn load_from_reader<R: BufRead>(reader: R) -> Result<HotelAvailability> {
    let mut hotels = HotelAvailability::new();

    for (i, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let record: Value = match serde_json::from_slice(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping malformed snapshot line {}: {e}", i + 1);
                continue;
            }
        };

        let Some(hotel_id) = record_hotel_id(&record) else {
            debug!("Skipping snapshot line {} without hotel_id", i + 1);
            continue;
        };

        let response = record.get("response").unwrap_or(&Value::Null);
        hotels.insert(hotel_id, normalize(response));
    }

    Ok(hotels)
}

fn record_hotel_id(record: &Value) -> Option<String> {
    let id = match record.get("hotel_id")? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}
