// ============================================================
// Layer 6 — JSON Files
// ============================================================
// Pretty-printed JSON for the small human-readable artifacts:
// reports/metrics.json and data/interim/label_encoding.json.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::error::{PipelineError, PipelineResult};

/// Write `value` as pretty JSON, creating the parent directory
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> PipelineResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| PipelineError::parse(path, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io("create dir", parent, e))?;
    }
    fs::write(path, json + "\n").map_err(|e| PipelineError::io("write", path, e))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> PipelineResult<T> {
    let text = fs::read_to_string(path).map_err(|e| PipelineError::io("read", path, e))?;
    serde_json::from_str(&text).map_err(|e| PipelineError::parse(path, e))
}
