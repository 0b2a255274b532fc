// ============================================================
// Layer 3 — Table (Dataset Partition)
// ============================================================
// An ordered sequence of rows with named string columns.
// Raw and processed partitions share this one type; the
// difference is only which transforms have been applied.
//
// Missing values are represented by the empty string, which
// is also how they round-trip through CSV.
//
// No file I/O lives here. Reading and writing CSV belongs
// to data::loader.

use std::collections::HashSet;

use crate::domain::error::{PipelineError, PipelineResult};

/// Canonical name of the class-label column after ingestion
pub const TARGET_COLUMN: &str = "target";

/// Canonical name of the message-body column after ingestion
pub const TEXT_COLUMN: &str = "text";

/// The two roles a partition can play in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Train,
    Test,
}

impl Partition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Test  => "test",
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows:    Vec<Vec<String>>,
}

impl Table {
    /// Build a table. Every row is padded or truncated to the column count
    /// so later column lookups can index without bounds checks failing.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column, or a SchemaError naming `context`
    pub fn column_index(&self, name: &str, context: &str) -> PipelineResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PipelineError::schema(name, context))
    }

    /// Fail on the first absent column without touching the table
    pub fn require_columns(&self, names: &[&str], context: &str) -> PipelineResult<()> {
        for name in names {
            self.column_index(name, context)?;
        }
        Ok(())
    }

    /// Remove every named column. All names are checked before anything is
    /// removed, so a failed call leaves the table unchanged.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S], context: &str) -> PipelineResult<()> {
        let mut doomed = Vec::with_capacity(names.len());
        for name in names {
            doomed.push(self.column_index(name.as_ref(), context)?);
        }
        doomed.sort_unstable();
        doomed.dedup();

        // Remove from the back so earlier indices stay valid
        for &idx in doomed.iter().rev() {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
        Ok(())
    }

    pub fn rename_column(&mut self, from: &str, to: &str, context: &str) -> PipelineResult<()> {
        let idx = self.column_index(from, context)?;
        self.columns[idx] = to.to_string();
        Ok(())
    }

    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |r| r[idx].as_str())
    }

    /// Rewrite every cell of one column in place
    pub fn map_column<F>(&mut self, idx: usize, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
    }

    /// New table holding the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows:    indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Drop exact duplicate rows, keeping the first occurrence.
    ///
    /// Rows are compared column by column in name order rather than
    /// position order, so the result does not depend on how the columns
    /// happen to be arranged. Returns how many rows were removed.
    pub fn dedup_rows(&mut self) -> usize {
        let mut order: Vec<usize> = (0..self.columns.len()).collect();
        order.sort_by(|&a, &b| self.columns[a].cmp(&self.columns[b]));

        let before = self.rows.len();
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
        self.rows.retain(|row| {
            let key: Vec<String> = order.iter().map(|&i| row[i].clone()).collect();
            seen.insert(key)
        });
        before - self.rows.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["v1".into(), "v2".into(), "junk".into()],
            vec![
                vec!["ham".into(), "hi there".into(), "".into()],
                vec!["spam".into(), "win money".into()],
            ],
        )
    }

    #[test]
    fn test_short_rows_are_padded() {
        let t = sample();
        assert_eq!(t.rows()[1], vec!["spam", "win money", ""]);
    }

    #[test]
    fn test_drop_and_rename() {
        let mut t = sample();
        t.drop_columns(&["junk"], "raw").unwrap();
        t.rename_column("v1", "target", "raw").unwrap();
        assert_eq!(t.columns(), &["target".to_string(), "v2".to_string()]);
        assert_eq!(t.rows()[0].len(), 2);
    }

    #[test]
    fn test_failed_drop_leaves_table_untouched() {
        let mut t = sample();
        let err = t.drop_columns(&["junk", "missing"], "raw").unwrap_err();
        assert!(matches!(err, PipelineError::Schema { ref column, .. } if column == "missing"));
        assert_eq!(t, sample());
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut t = Table::new(
            vec!["target".into(), "text".into()],
            vec![
                vec!["0".into(), "a".into()],
                vec!["1".into(), "b".into()],
                vec!["0".into(), "a".into()],
            ],
        );
        assert_eq!(t.dedup_rows(), 1);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[1][1], "b");
    }

    #[test]
    fn test_dedup_ignores_column_arrangement() {
        let rows = vec![
            vec!["0".into(), "a".into()],
            vec!["0".into(), "a".into()],
            vec!["1".into(), "a".into()],
        ];
        let mut left  = Table::new(vec!["target".into(), "text".into()], rows.clone());
        let mut right = Table::new(
            vec!["text".into(), "target".into()],
            rows.into_iter().map(|r| vec![r[1].clone(), r[0].clone()]).collect(),
        );
        assert_eq!(left.dedup_rows(), right.dedup_rows());
        assert_eq!(left.len(), right.len());
    }

    #[test]
    fn test_select_rows_preserves_order() {
        let t = sample();
        let picked = t.select_rows(&[1, 0]);
        assert_eq!(picked.rows()[0][0], "spam");
        assert_eq!(picked.rows()[1][0], "ham");
    }
}
