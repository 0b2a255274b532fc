// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// models/model.pkl + data/processed/test_tfidf.csv
//   → reports/metrics.json
//
//   Step 1: Load the model artifact           (Layer 6 - infra)
//   Step 2: Read the test feature matrix      (Layer 4 - data)
//   Step 3: Check the feature width matches   (Layer 3 - domain)
//   Step 4: Predict, score, compute metrics   (Layer 5 - ml)
//   Step 5: Write metrics.json                (Layer 6 - infra)

use crate::application::stage::{Stage, StageContext};
use crate::data::loader::read_feature_matrix;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::feature_matrix::FeatureMatrix;
use crate::domain::metrics::MetricsRecord;
use crate::domain::table::Partition;
use crate::domain::traits::Classifier;
use crate::infra::metrics::write_metrics;
use crate::infra::model_store::ModelStore;
use crate::ml::metrics::evaluate;

pub const STAGE_NAME: &str = "model_evaluation";

pub struct EvaluateUseCase;

impl Stage for EvaluateUseCase {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn execute(&self, ctx: &StageContext<'_>) -> PipelineResult<()> {
        ctx.params()?;

        let store    = ModelStore::new(ctx.layout.model_file());
        let artifact = store.load()?;
        tracing::info!(
            "Loaded model (format v{}) with hyperparameters {:?}",
            artifact.format_version,
            artifact.forest.config()
        );

        let matrix  = read_feature_matrix(&ctx.layout.features_partition(Partition::Test))?;
        let metrics = evaluate_classifier(&artifact.forest, &matrix)?;

        tracing::info!(
            "accuracy={:.4} precision={:.4} recall={:.4} auc={:.4}",
            metrics.accuracy,
            metrics.precision,
            metrics.recall,
            metrics.auc
        );

        let path = ctx.layout.metrics_file();
        write_metrics(&metrics, &path)?;
        tracing::info!("Metrics saved to '{}'", path.display());
        Ok(())
    }
}

/// Score any classifier on a feature matrix
pub fn evaluate_classifier(model: &dyn Classifier, matrix: &FeatureMatrix) -> PipelineResult<MetricsRecord> {
    if matrix.n_features() != model.n_features() {
        return Err(PipelineError::ShapeMismatch {
            context:  "test features vs model",
            expected: model.n_features(),
            actual:   matrix.n_features(),
        });
    }

    let predictions = model.predict(matrix.features());
    let scores = match model.positive_scores(matrix.features()) {
        Some(scores) => scores,
        None => {
            tracing::warn!("Model has no probability scores; AUC uses hard predictions");
            predictions.iter().map(|&p| p as f64).collect()
        }
    };

    evaluate(matrix.labels(), &predictions, &scores)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Predicts class 1 when the first feature exceeds 0.5, no scores
    struct Threshold;

    impl Classifier for Threshold {
        fn n_features(&self) -> usize {
            2
        }

        fn predict(&self, rows: &[Vec<f64>]) -> Vec<usize> {
            rows.iter().map(|r| usize::from(r[0] > 0.5)).collect()
        }
    }

    fn matrix(width: usize) -> FeatureMatrix {
        let features = vec![vec![0.9; width], vec![0.1; width], vec![0.8; width]];
        FeatureMatrix::new(
            (0..width).map(|i| format!("t{i}")).collect(),
            features,
            vec![1, 0, 0],
        )
        .unwrap()
    }

    #[test]
    fn test_falls_back_to_hard_predictions() {
        let m = evaluate_classifier(&Threshold, &matrix(2)).unwrap();
        assert_eq!(m.accuracy, 2.0 / 3.0);
        assert_eq!(m.precision, 0.5);
        assert_eq!(m.recall, 1.0);
        // scores [1, 0, 1]: positive ties one negative, beats the other
        assert_eq!(m.auc, 0.75);
    }

    #[test]
    fn test_width_mismatch() {
        let err = evaluate_classifier(&Threshold, &matrix(3)).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch { expected: 2, actual: 3, .. }));
    }
}
