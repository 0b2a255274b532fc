// ============================================================
// Layer 6 — Model Store
// ============================================================
// Saves and restores the fitted classifier as one binary blob.
//
// What is in models/model.pkl:
//   format_version   — bumped whenever the layout changes
//   forest           — trees, hyperparameters, feature count
//                      and class count
//
// Encoding is bincode's standard configuration. Loading fails
// with an Artifact error if the bytes don't decode, if bytes
// are left over, or if the format version is not ours. An
// old model never gets silently misread.

use std::fs;
use std::path::{Path, PathBuf};

use bincode::{Decode, Encode};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::ml::random_forest::RandomForest;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub forest:         RandomForest,
}

impl ModelArtifact {
    pub fn new(forest: RandomForest) -> Self {
        Self { format_version: FORMAT_VERSION, forest }
    }
}

/// Reads and writes the model artifact at one fixed path
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode and write the artifact, creating the parent directory
    pub fn save(&self, artifact: &ModelArtifact) -> PipelineResult<()> {
        let bytes = bincode::encode_to_vec(artifact, bincode::config::standard())
            .map_err(|e| self.artifact_error(e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io("create dir", parent, e))?;
        }
        fs::write(&self.path, &bytes).map_err(|e| PipelineError::io("write", &self.path, e))?;

        tracing::debug!("Saved model artifact ({} bytes) to '{}'", bytes.len(), self.path.display());
        Ok(())
    }

    pub fn load(&self) -> PipelineResult<ModelArtifact> {
        let bytes = fs::read(&self.path).map_err(|e| PipelineError::io("read", &self.path, e))?;

        let (artifact, used): (ModelArtifact, usize) =
            bincode::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| self.artifact_error(e))?;

        if used != bytes.len() {
            return Err(self.artifact_error(format!(
                "{} trailing bytes after the model",
                bytes.len() - used
            )));
        }
        if artifact.format_version != FORMAT_VERSION {
            return Err(self.artifact_error(format!(
                "format version {} is not supported (expected {})",
                artifact.format_version, FORMAT_VERSION
            )));
        }
        Ok(artifact)
    }

    fn artifact_error(&self, reason: impl ToString) -> PipelineError {
        PipelineError::Artifact { path: self.path.clone(), reason: reason.to_string() }
    }
}
