// ============================================================
// Layer 2 — PreprocessUseCase
// ============================================================
// data/raw/{train,test}.csv → data/interim/{train,test}_processed.csv
//
//   Step 1: Read both raw partitions          (Layer 4 - data)
//   Step 2: Check `target` and `text` exist    (Layer 3 - domain)
//   Step 3: Fit the label encoder on the
//           train labels and encode `target`
//           as an integer                     (Layer 4 - data)
//   Step 4: Drop exact duplicate rows         (Layer 3 - domain)
//   Step 5: Normalise every text cell         (Layer 4 - data)
//   Step 6: Write partitions + encoding       (Layer 4 / 6)
//
// Duplicates are judged on the raw text, so two different
// messages that happen to clean to the same string both stay.
// Train labels alone decide the codes. A label that only
// occurs in test is appended after them with a warning, and
// an empty label fails the stage with the offending row.

use crate::application::stage::{Stage, StageContext};
use crate::data::label_encoder::LabelEncoder;
use crate::data::loader::{write_table, CsvLoader};
use crate::data::preprocessor::Preprocessor;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::table::{Partition, Table, TARGET_COLUMN, TEXT_COLUMN};
use crate::domain::traits::TableSource;
use crate::infra::json_file::write_json;

pub const STAGE_NAME: &str = "data_preprocessing";

pub struct PreprocessUseCase;

impl Stage for PreprocessUseCase {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn execute(&self, ctx: &StageContext<'_>) -> PipelineResult<()> {
        // No section of its own, but a broken params file still fails the stage
        ctx.params()?;

        let train = CsvLoader::new(ctx.layout.raw_partition(Partition::Train)).load()?;
        let test  = CsvLoader::new(ctx.layout.raw_partition(Partition::Test)).load()?;
        tracing::info!("Read {} train / {} test raw rows", train.len(), test.len());

        let processed = preprocess(train, test)?;

        for (part, table) in [(Partition::Train, &processed.train), (Partition::Test, &processed.test)] {
            let path = ctx.layout.interim_partition(part);
            write_table(table, &path)?;
            tracing::info!("Wrote {} processed {} rows to '{}'", table.len(), part, path.display());
        }

        let encoding_path = ctx.layout.label_encoding();
        write_json(&processed.encoder, &encoding_path)?;
        tracing::info!("Label encoding {:?} saved to '{}'", processed.encoder.classes(), encoding_path.display());
        Ok(())
    }
}

#[derive(Debug)]
pub struct Preprocessed {
    pub train:   Table,
    pub test:    Table,
    pub encoder: LabelEncoder,
}

/// Clean text, encode labels and dedup both partitions in memory
pub fn preprocess(mut train: Table, mut test: Table) -> PipelineResult<Preprocessed> {
    train.require_columns(&[TARGET_COLUMN, TEXT_COLUMN], "train partition")?;
    test.require_columns(&[TARGET_COLUMN, TEXT_COLUMN], "test partition")?;

    let train_target = train.column_index(TARGET_COLUMN, "train partition")?;
    let test_target  = test.column_index(TARGET_COLUMN, "test partition")?;
    check_labels(&train, train_target, Partition::Train)?;
    check_labels(&test, test_target, Partition::Test)?;

    let mut encoder = LabelEncoder::fit(train.column_values(train_target));
    let unseen = encoder.extend(test.column_values(test_target));
    if !unseen.is_empty() {
        tracing::warn!(
            "Test labels {:?} do not occur in train; coded after the train labels",
            unseen
        );
    }
    if encoder.classes().len() > 2 {
        tracing::warn!(
            "{} distinct labels found {:?}; evaluation only supports binary labels",
            encoder.classes().len(),
            encoder.classes()
        );
    }

    let preprocessor = Preprocessor::new();
    for (part, table) in [(Partition::Train, &mut train), (Partition::Test, &mut test)] {
        transform_partition(table, &preprocessor, &encoder, part)?;
    }

    Ok(Preprocessed { train, test, encoder })
}

fn transform_partition(
    table:        &mut Table,
    preprocessor: &Preprocessor,
    encoder:      &LabelEncoder,
    part:         Partition,
) -> PipelineResult<()> {
    let context = format!("{part} partition");
    let text    = table.column_index(TEXT_COLUMN, &context)?;
    let target  = table.column_index(TARGET_COLUMN, &context)?;

    // The encoder knows every label of both partitions
    table.map_column(target, |label| {
        encoder.encode(label).map(|code| code.to_string()).unwrap_or_default()
    });

    let removed = table.dedup_rows();
    if removed > 0 {
        tracing::info!("Dropped {} duplicate {} rows", removed, part);
    }

    let empty = table.column_values(text).filter(|t| t.trim().is_empty()).count();
    if empty > 0 {
        tracing::warn!("{} {} rows have empty text; they become empty token lists", empty, part);
    }
    table.map_column(text, |t| preprocessor.transform(t));
    Ok(())
}

/// Rows are numbered from 1
fn check_labels(table: &Table, target: usize, part: Partition) -> PipelineResult<()> {
    match table.column_values(target).position(|label| label.trim().is_empty()) {
        Some(i) => Err(PipelineError::Label {
            partition: part.to_string(),
            row:       i + 1,
            reason:    "empty label".to_string(),
        }),
        None => Ok(()),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, &str)]) -> Table {
        Table::new(
            vec![TARGET_COLUMN.into(), TEXT_COLUMN.into()],
            rows.iter().map(|(l, t)| vec![l.to_string(), t.to_string()]).collect(),
        )
    }

    #[test]
    fn test_text_cleaned_and_labels_encoded() {
        let out = preprocess(
            table(&[("ham", "Hi there"), ("spam", "WIN money NOW!!!")]),
            table(&[("spam", "Claim your prizes")]),
        )
        .unwrap();

        assert_eq!(out.train.rows()[0], vec!["0", "hi"]);
        assert_eq!(out.train.rows()[1], vec!["1", "win money"]);
        assert_eq!(out.test.rows()[0], vec!["1", "claim prize"]);
    }

    #[test]
    fn test_test_labels_cannot_change_train_codes() {
        let train = table(&[("ham", "hello"), ("spam", "win")]);

        let out = preprocess(train.clone(), table(&[("spam", "prize")])).unwrap();
        assert_eq!(out.encoder.classes(), &["ham".to_string(), "spam".to_string()]);
        assert_eq!(out.train.rows()[0][0], "0");

        // "eggs" sorts before "ham" but only occurs in test
        let out = preprocess(train, table(&[("spam", "prize"), ("eggs", "bacon")])).unwrap();
        assert_eq!(out.train.rows()[0][0], "0");
        assert_eq!(out.train.rows()[1][0], "1");
        assert_eq!(out.test.rows()[1][0], "2");
        assert_eq!(out.encoder.decode(2), Some("eggs"));
    }

    #[test]
    fn test_single_class_train_codes_start_at_zero() {
        let out = preprocess(table(&[("spam", "win")]), table(&[("ham", "hi")])).unwrap();
        assert_eq!(out.train.rows()[0][0], "0");
        assert_eq!(out.test.rows()[0][0], "1");
    }

    #[test]
    fn test_only_raw_duplicates_are_dropped() {
        let out = preprocess(
            table(&[("ham", "Hello there"), ("ham", "hello!"), ("ham", "Hello there"), ("spam", "hello")]),
            table(&[("ham", "x")]),
        )
        .unwrap();
        // "Hello there" and "hello!" both clean to "hello" but differ as raw text
        assert_eq!(out.train.len(), 3);
        assert_eq!(out.train.rows()[0], vec!["0", "hello"]);
        assert_eq!(out.train.rows()[1], vec!["0", "hello"]);
    }

    #[test]
    fn test_empty_label_names_the_row() {
        let err = preprocess(table(&[("ham", "hi"), ("  ", "win")]), table(&[("ham", "x")])).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Label { ref partition, row: 2, .. } if partition == "train"
        ));
        assert!(err.to_string().contains("empty label"));

        let err = preprocess(table(&[("ham", "hi")]), table(&[("", "x")])).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Label { ref partition, row: 1, .. } if partition == "test"
        ));
    }

    #[test]
    fn test_empty_text_is_kept_as_empty() {
        let out = preprocess(table(&[("ham", ""), ("spam", "win")]), table(&[("ham", "   ")])).unwrap();
        assert_eq!(out.train.rows()[0], vec!["0", ""]);
        assert_eq!(out.test.rows()[0], vec!["0", ""]);
    }

    #[test]
    fn test_missing_text_column() {
        let bad = Table::new(vec![TARGET_COLUMN.into()], vec![vec!["ham".into()]]);
        let err = preprocess(table(&[("ham", "hi")]), bad).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { ref column, .. } if column == "text"));
    }
}
