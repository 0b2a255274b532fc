// ============================================================
// Layer 3 — Feature Matrix
// ============================================================
// Numeric vectorised-text features plus the integer label.
// On disk the label is the final column, named `label`;
// in memory the two halves are kept apart so nothing can
// accidentally treat the label as a feature.

use crate::domain::error::{PipelineError, PipelineResult};

/// Name of the final on-disk column
pub const LABEL_COLUMN: &str = "label";

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    feature_names: Vec<String>,
    features:      Vec<Vec<f64>>,
    labels:        Vec<usize>,
}

impl FeatureMatrix {
    /// Build a matrix, checking that every row has one label and
    /// exactly `feature_names.len()` values.
    pub fn new(
        feature_names: Vec<String>,
        features:      Vec<Vec<f64>>,
        labels:        Vec<usize>,
    ) -> PipelineResult<Self> {
        if features.len() != labels.len() {
            return Err(PipelineError::ShapeMismatch {
                context:  "feature rows vs labels",
                expected: features.len(),
                actual:   labels.len(),
            });
        }
        if let Some(row) = features.iter().find(|r| r.len() != feature_names.len()) {
            return Err(PipelineError::ShapeMismatch {
                context:  "feature row width",
                expected: feature_names.len(),
                actual:   row.len(),
            });
        }
        Ok(Self { feature_names, features, labels })
    }

    /// Positional feature names `0..width`, matching the CSV header
    pub fn positional_names(width: usize) -> Vec<String> {
        (0..width).map(|i| i.to_string()).collect()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn n_rows(&self) -> usize {
        self.features.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count_mismatch_is_rejected() {
        let err = FeatureMatrix::new(
            FeatureMatrix::positional_names(2),
            vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            vec![1],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = FeatureMatrix::new(
            FeatureMatrix::positional_names(2),
            vec![vec![0.0, 1.0], vec![1.0]],
            vec![0, 1],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch { context: "feature row width", .. }));
    }
}
