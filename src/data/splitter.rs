// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Shuffles rows with a seeded generator and splits them into
// two disjoint sets:
//   - Training set: used to fit the vectorizer and the model
//   - Test set:     held out for evaluation only
//
// Reproducibility:
//   The shuffle uses ChaCha8 seeded from `seed`, so the same
//   input and seed always give the same permutation, on any
//   platform and across runs.
//
// Sizes:
//   n_test  = ceil(test_fraction * n)
//   n_train = n - n_test
//   The first n_test shuffled rows become the test set.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::error::{PipelineError, PipelineResult};

/// Number of test rows for `total` rows at `test_fraction`.
/// Validates 0 < fraction < 1 and that both sides end up non-empty.
pub fn test_count(total: usize, test_fraction: f64) -> PipelineResult<usize> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::invalid(
            "data_ingestion.test_size",
            format!("{test_fraction} is not strictly between 0 and 1"),
        ));
    }

    let n_test = ((total as f64) * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= total {
        return Err(PipelineError::invalid(
            "data_ingestion.test_size",
            format!("{total} rows at test_size={test_fraction} leaves an empty partition"),
        ));
    }
    Ok(n_test)
}

/// Shuffled row indices split into (train, test).
///
/// # Example
/// ```
/// use sms_spam_pipeline::data::splitter::split_indices;
/// let (train, test) = split_indices(10, 0.2, 42).unwrap();
/// assert_eq!((train.len(), test.len()), (8, 2));
/// ```
pub fn split_indices(
    total:         usize,
    test_fraction: f64,
    seed:          u64,
) -> PipelineResult<(Vec<usize>, Vec<usize>)> {
    let n_test = test_count(total, test_fraction)?;

    let mut order: Vec<usize> = (0..total).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    // split_off(n) leaves [0..n) in `order` and returns [n..)
    let train = order.split_off(n_test);
    let test  = order;

    tracing::debug!(
        "Dataset split: {} training, {} test ({}% / {}%)",
        train.len(),
        test.len(),
        (train.len() * 100) / total.max(1),
        (test.len()  * 100) / total.max(1),
    );

    Ok((train, test))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_correct_split_sizes() {
        let (train, test) = split_indices(100, 0.2, 42).unwrap();
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(),  20);
    }

    #[test]
    fn test_test_side_rounds_up() {
        // 0.25 * 10 = 2.5 → 3 test rows
        let (train, test) = split_indices(10, 0.25, 0).unwrap();
        assert_eq!((train.len(), test.len()), (7, 3));
    }

    #[test]
    fn test_two_rows_half_split() {
        let (train, test) = split_indices(2, 0.5, 42).unwrap();
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(),  1);
        assert_ne!(train[0], test[0]);
    }

    #[test]
    fn test_same_seed_same_split() {
        assert_eq!(split_indices(50, 0.3, 7).unwrap(), split_indices(50, 0.3, 7).unwrap());
    }

    #[test]
    fn test_rejects_out_of_range_fraction() {
        for f in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(split_indices(10, f, 42).is_err(), "fraction {f} accepted");
        }
    }

    #[test]
    fn test_rejects_empty_partition() {
        // one row can never be split into two non-empty sets
        assert!(split_indices(1, 0.5, 42).is_err());
        assert!(split_indices(0, 0.5, 42).is_err());
    }

    proptest! {
        #[test]
        fn prop_split_is_a_partition(total in 2usize..400, f in 0.01f64..0.99, seed in any::<u64>()) {
            if let Ok((train, test)) = split_indices(total, f, seed) {
                prop_assert_eq!(train.len() + test.len(), total);

                let all: HashSet<usize> = train.iter().chain(test.iter()).copied().collect();
                prop_assert_eq!(all.len(), total);

                // ceil rounding puts the test share within one row of f
                let expected = total as f64 * f;
                prop_assert!((test.len() as f64 - expected).abs() < 1.0);
            }
        }
    }
}
