// ============================================================
// Layer 6 — Project Layout
// ============================================================
// Every path a stage reads or writes, relative to one root.
//
//   <root>/
//     params.yaml
//     data/raw/{train,test}.csv
//     data/interim/{train,test}_processed.csv
//     data/interim/label_encoding.json
//     data/processed/{train,test}_tfidf.csv
//     models/model.pkl
//     reports/metrics.json
//     reports/training_steps.csv
//     logs/<run-timestamp>/<stage>.log
//
// The root is found by walking up from the working directory
// to the first directory holding a project marker.

use std::path::{Path, PathBuf};

use crate::domain::table::Partition;

/// Files or directories that mark the project root
const ROOT_MARKERS: [&str; 4] = [".git", "Cargo.lock", "dvc.yaml", "params.yaml"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Nearest ancestor of `start` (inclusive) holding a root marker,
    /// or `start` itself when there is none
    pub fn discover(start: &Path) -> Self {
        let found = start
            .ancestors()
            .find(|dir| ROOT_MARKERS.iter().any(|m| dir.join(m).exists()));
        match found {
            Some(dir) => Self::new(dir),
            None => Self::new(start),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn params_file(&self) -> PathBuf {
        self.root.join("params.yaml")
    }

    /// Resolve a configured data source. Accepts plain paths and
    /// `file://` URLs; relative paths are taken from the root.
    pub fn resolve_source(&self, source: &str) -> PathBuf {
        let raw = source.strip_prefix("file://").unwrap_or(source);
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("data").join("raw")
    }

    pub fn interim_dir(&self) -> PathBuf {
        self.root.join("data").join("interim")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("data").join("processed")
    }

    pub fn raw_partition(&self, part: Partition) -> PathBuf {
        self.raw_dir().join(format!("{part}.csv"))
    }

    pub fn interim_partition(&self, part: Partition) -> PathBuf {
        self.interim_dir().join(format!("{part}_processed.csv"))
    }

    pub fn label_encoding(&self) -> PathBuf {
        self.interim_dir().join("label_encoding.json")
    }

    pub fn features_partition(&self, part: Partition) -> PathBuf {
        self.processed_dir().join(format!("{part}_tfidf.csv"))
    }

    pub fn model_file(&self) -> PathBuf {
        self.root.join("models").join("model.pkl")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    pub fn metrics_file(&self) -> PathBuf {
        self.reports_dir().join("metrics.json")
    }

    pub fn training_steps_file(&self) -> PathBuf {
        self.reports_dir().join("training_steps.csv")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}
