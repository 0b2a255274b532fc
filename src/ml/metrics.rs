// ============================================================
// Layer 5 — Binary Classification Metrics
// ============================================================
// Accuracy, precision, recall and ROC AUC for labels in {0, 1},
// with 1 as the positive class.
//
// Undefined cases are pinned rather than NaN:
//   precision = 0 when nothing was predicted positive
//   recall    = 0 when there are no positive labels
//   auc       = 0.5 when y_true holds a single class
//
// AUC is the Mann-Whitney rank statistic: rank all scores
// (ties get the average rank), then
//   auc = (Σ ranks of positives − P(P+1)/2) / (P · N)

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::metrics::MetricsRecord;

/// Validate inputs and compute all four scores
pub fn evaluate(y_true: &[usize], y_pred: &[usize], scores: &[f64]) -> PipelineResult<MetricsRecord> {
    if y_true.is_empty() {
        return Err(PipelineError::Metric("no test rows to evaluate".to_string()));
    }
    if y_pred.len() != y_true.len() || scores.len() != y_true.len() {
        return Err(PipelineError::Metric(format!(
            "length mismatch: {} labels, {} predictions, {} scores",
            y_true.len(),
            y_pred.len(),
            scores.len()
        )));
    }
    if let Some(bad) = y_true.iter().chain(y_pred).find(|&&v| v > 1) {
        return Err(PipelineError::Metric(format!(
            "labels must be binary (0/1), found {bad}"
        )));
    }
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(PipelineError::Metric(format!("non-finite score {bad}")));
    }

    Ok(MetricsRecord {
        accuracy:  accuracy(y_true, y_pred),
        precision: precision(y_true, y_pred),
        recall:    recall(y_true, y_pred),
        auc:       roc_auc(y_true, scores),
    })
}

pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

pub fn precision(y_true: &[usize], y_pred: &[usize]) -> f64 {
    let (tp, fp, _) = confusion(y_true, y_pred);
    ratio(tp, tp + fp)
}

pub fn recall(y_true: &[usize], y_pred: &[usize]) -> f64 {
    let (tp, _, fn_) = confusion(y_true, y_pred);
    ratio(tp, tp + fn_)
}

pub fn roc_auc(y_true: &[usize], scores: &[f64]) -> f64 {
    let n_pos = y_true.iter().filter(|&&t| t == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        tracing::warn!("ROC AUC undefined for a single class, reporting 0.5");
        return 0.5;
    }

    let ranks = average_ranks(scores);
    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(&ranks)
        .filter(|(t, _)| **t == 1)
        .map(|(_, r)| *r)
        .sum();

    let p = n_pos as f64;
    (pos_rank_sum - p * (p + 1.0) / 2.0) / (p * n_neg as f64)
}

/// (true positives, false positives, false negatives)
fn confusion(y_true: &[usize], y_pred: &[usize]) -> (usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_ = 0;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t, p) {
            (1, 1) => tp += 1,
            (_, 1) => fp += 1,
            (1, _) => fn_ += 1,
            _ => {}
        }
    }
    (tp, fp, fn_)
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// 1-based ranks, tied values sharing their mean rank
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0f64; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j are tied; their ranks are i+1 ..= j+1
        let mean = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = mean;
        }
        i = j + 1;
    }
    ranks
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = [0, 1, 1, 0];
        let m = evaluate(&y, &y, &[0.1, 0.9, 0.8, 0.2]).unwrap();
        assert_eq!(m, MetricsRecord { accuracy: 1.0, precision: 1.0, recall: 1.0, auc: 1.0 });
    }

    #[test]
    fn test_precision_and_recall() {
        let y_true = [1, 1, 0, 0, 1];
        let y_pred = [1, 0, 1, 0, 1];
        assert_eq!(precision(&y_true, &y_pred), 2.0 / 3.0);
        assert_eq!(recall(&y_true, &y_pred), 2.0 / 3.0);
        assert_eq!(accuracy(&y_true, &y_pred), 3.0 / 5.0);
    }

    #[test]
    fn test_undefined_precision_and_recall_are_zero() {
        assert_eq!(precision(&[1, 0], &[0, 0]), 0.0);
        assert_eq!(recall(&[0, 0], &[1, 0]), 0.0);
    }

    #[test]
    fn test_auc_averages_ties() {
        // one positive and one negative with the same score
        assert_eq!(roc_auc(&[0, 1], &[0.5, 0.5]), 0.5);
        // 3 of 4 positive/negative pairs ordered correctly
        assert_eq!(roc_auc(&[0, 0, 1, 1], &[0.1, 0.6, 0.4, 0.8]), 0.75);
    }

    #[test]
    fn test_auc_single_class_is_half() {
        assert_eq!(roc_auc(&[1, 1, 1], &[0.2, 0.4, 0.9]), 0.5);
        let m = evaluate(&[0], &[0], &[0.0]).unwrap();
        assert_eq!(m.auc, 0.5);
        assert!(m.is_well_formed());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(evaluate(&[], &[], &[]), Err(PipelineError::Metric(_))));
        assert!(matches!(evaluate(&[0, 2], &[0, 1], &[0.0, 1.0]), Err(PipelineError::Metric(_))));
        assert!(matches!(evaluate(&[0, 1], &[0], &[0.0, 1.0]), Err(PipelineError::Metric(_))));
    }
}
