// ============================================================
// Layer 4 — Label Encoder
// ============================================================
// Maps class names ("ham", "spam") to integer indices.
//
// The mapping is deterministic: distinct labels are sorted
// and numbered from 0, so the same inputs always give the
// same encoding ("ham" = 0, "spam" = 1).
//
// Labels added later with `extend` go after the fitted ones,
// so codes handed out by `fit` never change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Distinct labels in code order
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on every label value seen, in any order
    pub fn fit<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let classes: BTreeSet<&str> = labels.into_iter().collect();
        Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    /// Append labels not seen yet, sorted among themselves.
    /// Returns the labels that were added.
    pub fn extend<'a, I>(&mut self, labels: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unseen: BTreeSet<&str> = labels.into_iter().filter(|l| self.encode(l).is_none()).collect();
        let added: Vec<String> = unseen.into_iter().map(str::to_string).collect();
        self.classes.extend(added.iter().cloned());
        added
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.as_str() == label)
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_encoding() {
        let enc = LabelEncoder::fit(["spam", "ham", "spam"]);
        assert_eq!(enc.classes(), &["ham".to_string(), "spam".to_string()]);
        assert_eq!(enc.encode("ham"), Some(0));
        assert_eq!(enc.encode("spam"), Some(1));
        assert_eq!(enc.encode("eggs"), None);
        assert_eq!(enc.decode(1), Some("spam"));
    }

    #[test]
    fn test_extend_keeps_fitted_codes() {
        let mut enc = LabelEncoder::fit(["spam", "ham"]);
        let added = enc.extend(["spam", "zebra", "eggs", "eggs"]);
        assert_eq!(added, vec!["eggs".to_string(), "zebra".to_string()]);
        assert_eq!(enc.encode("ham"), Some(0));
        assert_eq!(enc.encode("spam"), Some(1));
        assert_eq!(enc.encode("eggs"), Some(2));
        assert_eq!(enc.encode("zebra"), Some(3));
        assert!(enc.extend(["ham"]).is_empty());
    }

    #[test]
    fn test_fit_order_does_not_matter() {
        assert_eq!(LabelEncoder::fit(["b", "a"]), LabelEncoder::fit(["a", "b", "a"]));
    }
}
