// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The evaluation stage only needs three things from a model:
// how many features it expects, hard predictions, and
// positive-class scores when the model can produce them.
//
// Implementations:
//   - RandomForest → predictions + averaged leaf probabilities
//   - (test stubs)  → predictions only, exercising the fallback

use crate::domain::error::PipelineResult;
use crate::domain::table::Table;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Anything that can produce a raw tabular dataset.
///
/// Implementations:
///   - CsvLoader → a local CSV file (UTF-8 or Latin-1)
pub trait TableSource {
    /// Load the whole table or fail with Parse / Io
    fn load(&self) -> PipelineResult<Table>;

    /// Human readable origin, used in log lines and error context
    fn describe(&self) -> String;
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A fitted binary or multi-class classifier over dense feature rows.
pub trait Classifier {
    /// Width of the feature rows this classifier was fitted on
    fn n_features(&self) -> usize;

    /// Predicted class index for every row
    fn predict(&self, rows: &[Vec<f64>]) -> Vec<usize>;

    /// Score for class 1 per row, higher meaning more likely positive.
    /// Returns None when the model cannot express a graded score;
    /// callers then fall back to the hard predictions.
    fn positive_scores(&self, _rows: &[Vec<f64>]) -> Option<Vec<f64>> {
        None
    }
}
