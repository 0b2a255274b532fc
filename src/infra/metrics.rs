// ============================================================
// Layer 6 — Metrics Writers
// ============================================================
// Two reports:
//
//   reports/metrics.json        — final scores on the test set,
//                                 overwritten every evaluation
//
//   reports/training_steps.csv  — training accuracy as the
//                                 forest grows, one row per step
//
// Example training_steps.csv:
//   n_trees,train_accuracy
//   10,0.962000
//   20,0.971500
//   ...
//
// The steps file is recreated on every training run so it
// only ever describes the model currently in models/.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::metrics::MetricsRecord;
use crate::infra::json_file::{read_json, write_json};

pub fn write_metrics(record: &MetricsRecord, path: &Path) -> PipelineResult<()> {
    write_json(record, path)?;
    tracing::debug!("Wrote metrics to '{}'", path.display());
    Ok(())
}

pub fn read_metrics(path: &Path) -> PipelineResult<MetricsRecord> {
    read_json(path)
}

/// One row of training_steps.csv
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingStep {
    /// Number of trees in the ensemble at this step
    pub n_trees: usize,

    /// Accuracy of that ensemble on the training rows
    pub train_accuracy: f64,
}

/// Appends one row per training step
pub struct StepMetricsLogger {
    csv_path: PathBuf,
    writer:   csv::Writer<File>,
}

impl StepMetricsLogger {
    /// Create (or truncate) the CSV and write its header
    pub fn create(csv_path: impl Into<PathBuf>) -> PipelineResult<Self> {
        let csv_path = csv_path.into();
        if let Some(parent) = csv_path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io("create dir", parent, e))?;
        }

        let file = File::create(&csv_path).map_err(|e| PipelineError::io("create", &csv_path, e))?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(["n_trees", "train_accuracy"])
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|e| PipelineError::io("write", &csv_path, e.into()))?;

        Ok(Self { csv_path, writer })
    }

    pub fn log(&mut self, step: &TrainingStep) -> PipelineResult<()> {
        let n_trees  = step.n_trees.to_string();
        let accuracy = format!("{:.6}", step.train_accuracy);
        self.writer
            .write_record([n_trees.as_str(), accuracy.as_str()])
            .and_then(|_| self.writer.flush().map_err(csv::Error::from))
            .map_err(|e| PipelineError::io("write", &self.csv_path, e.into()))?;

        tracing::debug!("Logged step: {} trees, train_accuracy={:.4}", step.n_trees, step.train_accuracy);
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_json_has_four_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("metrics.json");
        let record = MetricsRecord { accuracy: 0.9, precision: 0.8, recall: 0.7, auc: 0.95 };
        write_metrics(&record, &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 4);
        assert_eq!(read_metrics(&path).unwrap(), record);
    }

    #[test]
    fn test_steps_file_is_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training_steps.csv");

        let mut logger = StepMetricsLogger::create(&path).unwrap();
        logger.log(&TrainingStep { n_trees: 5, train_accuracy: 0.5 }).unwrap();
        logger.log(&TrainingStep { n_trees: 10, train_accuracy: 0.75 }).unwrap();
        drop(logger);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "n_trees,train_accuracy\n5,0.500000\n10,0.750000\n"
        );

        let mut logger = StepMetricsLogger::create(&path).unwrap();
        logger.log(&TrainingStep { n_trees: 1, train_accuracy: 1.0 }).unwrap();
        drop(logger);
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
