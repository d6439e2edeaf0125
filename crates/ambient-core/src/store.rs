//! On-disk documents: the state snapshot (single writer, many readers)
//! and the desire record (owned by the external desire system).
//!
//! Writes go to a uniquely named sibling temp file and are renamed over the
//! target, so a reader sees either the previous document or the new one.

use crate::error::{Error, Result};
use crate::types::{DesireRecord, StateSnapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serialize `value` as pretty JSON and atomically replace `path`.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let tmp = temp_sibling(path);
    if let Err(e) = fs::write(&tmp, json.as_bytes()).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!("Replaced {} ({} bytes)", path.display(), json.len());
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".into());
    path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
}

/// Read and parse a JSON document, distinguishing "absent" from "unparsable".
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::MissingState(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content).map_err(|e| Error::malformed(path, e.to_string()))
}

pub fn write_snapshot(path: &Path, snapshot: &StateSnapshot) -> Result<()> {
    write_json_atomic(path, snapshot)
}

pub fn read_snapshot(path: &Path) -> Result<StateSnapshot> {
    read_json(path)
}

/// Best-effort desire read: any failure yields `None`.
pub fn read_desires(path: &Path) -> Option<DesireRecord> {
    match read_json::<DesireRecord>(path) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("Desire record unavailable: {}", e);
            None
        }
    }
}
