// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// data/processed/train_tfidf.csv → models/model.pkl
//
//   Step 1: Read and validate model_training  (Layer 6 - infra)
//   Step 2: Read the train feature matrix     (Layer 4 - data)
//   Step 3: Fit the random forest             (Layer 5 - ml)
//   Step 4: Optionally report training
//           accuracy as the forest grows      (Layer 6 - infra)
//   Step 5: Save the model artifact           (Layer 6 - infra)
//
// Progress reporting refits nothing: the first k trees of a
// seeded forest are the k-tree forest, so each step is just
// a prediction with a prefix of the trees.

use std::fs;
use std::io::ErrorKind;

use crate::application::stage::{Stage, StageContext};
use crate::data::loader::read_feature_matrix;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::feature_matrix::FeatureMatrix;
use crate::domain::table::Partition;
use crate::infra::config::TrainingParams;
use crate::infra::metrics::{StepMetricsLogger, TrainingStep};
use crate::infra::model_store::{ModelArtifact, ModelStore};
use crate::ml::metrics::accuracy;
use crate::ml::random_forest::RandomForest;

pub const STAGE_NAME: &str = "model_training";

pub struct TrainUseCase;

impl Stage for TrainUseCase {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn execute(&self, ctx: &StageContext<'_>) -> PipelineResult<()> {
        let params = TrainingParams::from_params(&ctx.params()?)?;
        let config = params.forest()?;
        tracing::info!("Hyperparameters: {:?}", config);

        let matrix = read_feature_matrix(&ctx.layout.features_partition(Partition::Train))?;
        tracing::info!("Training on {} rows x {} features", matrix.n_rows(), matrix.n_features());

        let forest = RandomForest::fit(&config, matrix.features(), matrix.labels())?;
        tracing::info!("Fitted {} trees", forest.n_trees());

        let steps = training_steps(&forest, &matrix, params.progress_step);
        let steps_path = ctx.layout.training_steps_file();
        if steps.is_empty() {
            // A steps file from an earlier run would describe a different model
            match fs::remove_file(&steps_path) {
                Ok(()) => tracing::debug!("Removed stale '{}'", steps_path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(PipelineError::io("remove", &steps_path, e)),
            }
        } else {
            let mut logger = StepMetricsLogger::create(&steps_path)?;
            for step in &steps {
                tracing::info!("{:>4} trees: train_accuracy={:.4}", step.n_trees, step.train_accuracy);
                logger.log(step)?;
            }
            tracing::info!("Training steps written to '{}'", steps_path.display());
        }

        let store = ModelStore::new(ctx.layout.model_file());
        store.save(&ModelArtifact::new(forest))?;
        tracing::info!("Model saved to '{}'", store.path().display());
        Ok(())
    }
}

/// Training accuracy at k, 2k, ... trees, always ending at the full forest.
/// Empty when `step` is None.
pub fn training_steps(forest: &RandomForest, matrix: &FeatureMatrix, step: Option<usize>) -> Vec<TrainingStep> {
    let Some(step) = step.filter(|&k| k > 0) else {
        return Vec::new();
    };

    let total = forest.n_trees();
    let mut sizes: Vec<usize> = (step..=total).step_by(step).collect();
    if sizes.last() != Some(&total) {
        sizes.push(total);
    }

    sizes
        .into_iter()
        .map(|n_trees| TrainingStep {
            n_trees,
            train_accuracy: accuracy(matrix.labels(), &forest.predict_with(matrix.features(), n_trees)),
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::random_forest::ForestConfig;

    fn matrix() -> FeatureMatrix {
        FeatureMatrix::new(
            vec!["free".into(), "hi".into()],
            vec![vec![0.0, 1.0], vec![0.1, 0.9], vec![1.0, 0.0], vec![0.9, 0.2]],
            vec![0, 0, 1, 1],
        )
        .unwrap()
    }

    fn forest(n: usize) -> RandomForest {
        let m = matrix();
        RandomForest::fit(&ForestConfig { n_estimators: n, ..ForestConfig::default() }, m.features(), m.labels())
            .unwrap()
    }

    #[test]
    fn test_steps_end_at_full_forest() {
        let steps = training_steps(&forest(7), &matrix(), Some(3));
        let sizes: Vec<usize> = steps.iter().map(|s| s.n_trees).collect();
        assert_eq!(sizes, vec![3, 6, 7]);
        assert!(steps.iter().all(|s| (0.0..=1.0).contains(&s.train_accuracy)));
    }

    #[test]
    fn test_step_larger_than_forest() {
        let steps = training_steps(&forest(2), &matrix(), Some(5));
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].n_trees, 2);
    }

    #[test]
    fn test_no_step_no_report() {
        assert!(training_steps(&forest(2), &matrix(), None).is_empty());
    }
}
