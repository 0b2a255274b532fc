// ============================================================
// Layer 3 — Metrics Record
// ============================================================
// The four evaluation scores written to reports/metrics.json.
// Field order here is the order they appear in the file.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub accuracy:  f64,
    pub precision: f64,
    pub recall:    f64,
    pub auc:       f64,
}

impl MetricsRecord {
    /// True when every score is a finite value in [0, 1]
    pub fn is_well_formed(&self) -> bool {
        [self.accuracy, self.precision, self.recall, self.auc]
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }
}
