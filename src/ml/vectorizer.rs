// ============================================================
// Layer 5 — TF-IDF Vectorizer
// ============================================================
// Turns normalised text into fixed-width numeric rows.
//
// Fitting (train text only):
//   1. Analyse each document into terms: runs of two or more
//      word characters, lowercased
//   2. Count each term over the whole corpus (term frequency)
//      and per document (document frequency)
//   3. Keep the `max_features` most frequent terms, ties
//      broken alphabetically so the choice is deterministic
//   4. Order the kept terms alphabetically; that order is the
//      column order of the output
//   5. idf(t) = ln((1 + n_docs) / (1 + df(t))) + 1
//
// Transforming (train and test):
//   weight(t, d) = count(t, d) * idf(t), then each row is
//   scaled to unit L2 norm (all-zero rows stay all-zero).
//
// `fit` returns a separate FittedTfidf whose `transform`
// takes &self. Once fitted, the vocabulary cannot change.

use std::collections::HashMap;

use crate::domain::error::{PipelineError, PipelineResult};

/// Unfitted vectorizer: only the vocabulary cap
#[derive(Debug, Clone, Copy)]
pub struct TfidfVectorizer {
    max_features: usize,
}

/// Vocabulary and idf weights learned from the training corpus
#[derive(Debug, Clone, PartialEq)]
pub struct FittedTfidf {
    vocabulary: Vec<String>,
    index:      HashMap<String, usize>,
    idf:        Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    pub fn fit<S: AsRef<str>>(&self, docs: &[S]) -> PipelineResult<FittedTfidf> {
        if self.max_features == 0 {
            return Err(PipelineError::EmptyVocabulary {
                reason: "max_features is 0".to_string(),
            });
        }

        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq:  HashMap<String, usize> = HashMap::new();

        for doc in docs {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for term in analyze(doc.as_ref()) {
                *counts.entry(term).or_insert(0) += 1;
            }
            for (term, n) in counts {
                *term_freq.entry(term.clone()).or_insert(0) += n;
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if term_freq.is_empty() {
            return Err(PipelineError::EmptyVocabulary {
                reason: format!("{} training documents contain no terms", docs.len()),
            });
        }

        // Sort by frequency descending, then term ascending
        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        vocabulary.sort();

        let n_docs = docs.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        tracing::debug!(
            "TF-IDF fitted on {} documents: {} terms kept (cap {})",
            docs.len(),
            vocabulary.len(),
            self.max_features
        );

        Ok(FittedTfidf { vocabulary, index, idf })
    }
}

impl FittedTfidf {
    /// Terms in column order
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// One L2-normalised row per document. Terms outside the
    /// vocabulary are ignored.
    pub fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Vec<Vec<f64>> {
        docs.iter().map(|d| self.transform_one(d.as_ref())).collect()
    }

    fn transform_one(&self, doc: &str) -> Vec<f64> {
        let mut row = vec![0.0f64; self.vocabulary.len()];
        for term in analyze(doc) {
            if let Some(&col) = self.index.get(&term) {
                row[col] += 1.0;
            }
        }
        for (w, idf) in row.iter_mut().zip(&self.idf) {
            *w *= idf;
        }

        let norm = row.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for w in &mut row {
                *w /= norm;
            }
        }
        row
    }
}

/// Terms of two or more word characters, lowercased
pub fn analyze(doc: &str) -> Vec<String> {
    doc.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_analyze_drops_single_chars() {
        assert_eq!(analyze("win a £100 prize, u 2"), vec!["win", "100", "prize"]);
    }

    #[test]
    fn test_vocabulary_is_alphabetical_and_capped() {
        let docs = ["free free prize", "free call", "call now now now"];
        let fitted = TfidfVectorizer::new(2).fit(&docs).unwrap();
        // frequencies: free=3, now=3, call=2, prize=1 → keep free, now
        assert_eq!(fitted.vocabulary(), &["free".to_string(), "now".to_string()]);
    }

    #[test]
    fn test_frequency_ties_break_alphabetically() {
        let docs = ["beta alpha gamma"];
        let fitted = TfidfVectorizer::new(2).fit(&docs).unwrap();
        assert_eq!(fitted.vocabulary(), &["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_smoothed_idf() {
        let docs = ["free prize", "free call"];
        let fitted = TfidfVectorizer::new(10).fit(&docs).unwrap();
        let free = fitted.vocabulary().iter().position(|t| t == "free").unwrap();
        let call = fitted.vocabulary().iter().position(|t| t == "call").unwrap();
        assert!(approx(fitted.idf()[free], 1.0));
        assert!(approx(fitted.idf()[call], (3.0f64 / 2.0).ln() + 1.0));
    }

    #[test]
    fn test_rows_are_unit_length() {
        let docs = ["free prize now", "call me"];
        let fitted = TfidfVectorizer::new(10).fit(&docs).unwrap();
        for row in fitted.transform(&docs) {
            let norm: f64 = row.iter().map(|w| w * w).sum::<f64>().sqrt();
            assert!(approx(norm, 1.0));
        }
        let empty = fitted.transform(&["", "unseen words only"]);
        assert!(empty.iter().all(|r| r.iter().all(|&w| w == 0.0)));
    }

    #[test]
    fn test_transform_never_changes_vocabulary() {
        let fitted = TfidfVectorizer::new(5).fit(&["hi there", "win money now"]).unwrap();
        let before = fitted.clone();
        let rows = fitted.transform(&["totally different test words", "win"]);
        assert_eq!(fitted, before);
        assert!(rows.iter().all(|r| r.len() == before.n_features()));
    }

    #[test]
    fn test_zero_max_features_is_empty_vocabulary() {
        let err = TfidfVectorizer::new(0).fit(&["hi there"]).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyVocabulary { .. }));
    }

    #[test]
    fn test_all_empty_text_is_empty_vocabulary() {
        let err = TfidfVectorizer::new(10).fit(&["", "a", " "]).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyVocabulary { .. }));
    }
}
