// ============================================================
// Layer 5 — Random Forest Classifier
// ============================================================
// An ensemble of CART trees, each grown on its own bootstrap
// sample with a random feature subset at every node.
//
// Determinism:
//   Tree i draws from ChaCha8Rng::seed_from_u64(random_state)
//   on stream i. Each tree's randomness is therefore fixed by
//   (random_state, i) alone, so the first k trees of a forest
//   are exactly the forest you would get with n_estimators = k.
//   The training stage uses that to report accuracy as the
//   ensemble grows without refitting.
//
// Prediction:
//   proba(row) = mean of the leaf class distributions
//   predict    = argmax(proba), lowest class index on ties

use bincode::{Decode, Encode};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::Classifier;
use crate::ml::decision_tree::{DecisionTree, TreeConfig};

/// How many features each node may consider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum MaxFeatures {
    Sqrt,
    Log2,
    All,
    Count(usize),
}

impl MaxFeatures {
    /// Resolve against the actual feature count; never below 1
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features.max(1);
        let k = match self {
            Self::Sqrt     => (n as f64).sqrt().floor() as usize,
            Self::Log2     => (n as f64).log2().floor() as usize,
            Self::All      => n,
            Self::Count(k) => k.min(n),
        };
        k.max(1)
    }
}

/// Validated random-forest hyperparameters
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ForestConfig {
    pub n_estimators:      usize,
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    pub max_features:      MaxFeatures,
    pub bootstrap:         bool,
    pub random_state:      u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators:      100,
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      MaxFeatures::Sqrt,
            bootstrap:         true,
            random_state:      42,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.n_estimators == 0 {
            return Err(PipelineError::invalid("model_training.n_estimators", "must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(PipelineError::invalid(
                "model_training.min_samples_split",
                format!("must be at least 2, got {}", self.min_samples_split),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(PipelineError::invalid("model_training.min_samples_leaf", "must be at least 1"));
        }
        if self.max_features == MaxFeatures::Count(0) {
            return Err(PipelineError::invalid("model_training.max_features", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct RandomForest {
    config:     ForestConfig,
    trees:      Vec<DecisionTree>,
    n_features: usize,
    n_classes:  usize,
}

impl RandomForest {
    /// Fit on dense rows `x` with class indices `y`
    pub fn fit(config: &ForestConfig, x: &[Vec<f64>], y: &[usize]) -> PipelineResult<Self> {
        config.validate()?;

        if x.len() != y.len() {
            return Err(PipelineError::ShapeMismatch {
                context:  "random forest labels",
                expected: x.len(),
                actual:   y.len(),
            });
        }
        if x.is_empty() {
            return Err(PipelineError::ShapeMismatch {
                context:  "random forest training rows",
                expected: 1,
                actual:   0,
            });
        }

        let n_features = x[0].len();
        if let Some(bad) = x.iter().find(|r| r.len() != n_features) {
            return Err(PipelineError::ShapeMismatch {
                context:  "random forest row width",
                expected: n_features,
                actual:   bad.len(),
            });
        }

        let n_classes = y.iter().copied().max().map_or(2, |m| (m + 1).max(2));
        let tree_cfg = TreeConfig {
            max_depth:         config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf:  config.min_samples_leaf,
            max_features:      config.max_features.resolve(n_features),
        };

        let n = x.len();
        let trees: Vec<DecisionTree> = (0..config.n_estimators)
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.random_state);
                rng.set_stream(i as u64);

                let sample: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(x, y, sample, n_classes, &tree_cfg, &mut rng)
            })
            .collect();

        tracing::debug!(
            "Random forest fitted: {} trees, {} features, {} classes, {} features per split",
            trees.len(),
            n_features,
            n_classes,
            tree_cfg.max_features
        );

        Ok(Self { config: config.clone(), trees, n_features, n_classes })
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn predict_proba(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        self.predict_proba_with(rows, self.trees.len())
    }

    /// Class probabilities from the first `n_trees` trees only
    pub fn predict_proba_with(&self, rows: &[Vec<f64>], n_trees: usize) -> Vec<Vec<f64>> {
        let used = &self.trees[..n_trees.clamp(1, self.trees.len())];
        let scale = 1.0 / used.len() as f64;

        rows.iter()
            .map(|row| {
                let mut acc = vec![0.0f64; self.n_classes];
                for tree in used {
                    for (a, p) in acc.iter_mut().zip(tree.predict_proba_row(row)) {
                        *a += p;
                    }
                }
                acc.iter_mut().for_each(|a| *a *= scale);
                acc
            })
            .collect()
    }

    pub fn predict_with(&self, rows: &[Vec<f64>], n_trees: usize) -> Vec<usize> {
        self.predict_proba_with(rows, n_trees)
            .iter()
            .map(|p| argmax(p))
            .collect()
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Vec<usize> {
        self.predict_with(rows, self.trees.len())
    }

    fn positive_scores(&self, rows: &[Vec<f64>]) -> Option<Vec<f64>> {
        Some(
            self.predict_proba(rows)
                .into_iter()
                .map(|p| p.get(1).copied().unwrap_or(0.0))
                .collect(),
        )
    }
}

fn argmax(p: &[f64]) -> usize {
    let mut best = 0usize;
    for (i, &v) in p.iter().enumerate() {
        if v > p[best] {
            best = i;
        }
    }
    best
}
