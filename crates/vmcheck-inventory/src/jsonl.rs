//! JSONL storage: one line per node.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;
use vmcheck_kernel::NodeRecord;

/// One listing of the fleet, read from one file.
#[derive(Debug, Clone)]
pub struct FleetSnapshot {
    pub path: PathBuf,
    pub records: Vec<NodeRecord>,
}

/// Read node records from a JSONL reader.
///
/// Blank lines and lines starting with `#` are ignored.
pub fn read_records(reader: impl BufRead) -> Result<Vec<NodeRecord>, JsonlError> {
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| JsonlError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: NodeRecord = serde_json::from_str(trimmed)
            .map_err(|e| JsonlError::Parse(line_no + 1, e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

/// Read node records from a JSONL file path.
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<NodeRecord>, JsonlError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| JsonlError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    validate_snapshot_bytes(path, &bytes)?;
    let records = read_records(BufReader::new(bytes.as_slice()))?;
    debug!(path = %path.display(), nodes = records.len(), "loaded fleet snapshot");
    Ok(records)
}

/// Load every snapshot in order; the first failure stops the load.
pub fn load_snapshots<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<FleetSnapshot>, JsonlError> {
    paths
        .iter()
        .map(|p| {
            let path = p.as_ref();
            Ok(FleetSnapshot {
                path: path.to_path_buf(),
                records: read_records_from_path(path)?,
            })
        })
        .collect()
}

fn validate_snapshot_bytes(path: &Path, bytes: &[u8]) -> Result<(), JsonlError> {
    if bytes.contains(&0) {
        return Err(JsonlError::Corrupt(format!(
            "{}: contains NUL byte(s)",
            path.display()
        )));
    }
    if std::str::from_utf8(bytes).is_err() {
        return Err(JsonlError::Corrupt(format!(
            "{}: contains non-UTF-8 byte sequence(s)",
            path.display()
        )));
    }
    Ok(())
}

/// Errors from JSONL operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("{}: cannot read snapshot: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("corrupted snapshot: {0}")]
    Corrupt(String),
}
