// ============================================================
// Layer 2 — FeaturesUseCase
// ============================================================
// data/interim/*_processed.csv → data/processed/*_tfidf.csv
//
//   Step 1: Read max_features                 (Layer 6 - infra)
//   Step 2: Read both processed partitions    (Layer 4 - data)
//   Step 3: Fit TF-IDF on train text only     (Layer 5 - ml)
//   Step 4: Transform train and test with
//           the same fitted vocabulary        (Layer 5 - ml)
//   Step 5: Append `label`, write matrices    (Layer 4 - data)
//
// The fitted vocabulary is read-only from step 4 on, so test
// data can shape neither the columns nor the idf weights.

use std::path::Path;

use crate::application::stage::{Stage, StageContext};
use crate::data::loader::{write_feature_matrix, CsvLoader};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::feature_matrix::FeatureMatrix;
use crate::domain::table::{Partition, Table, TARGET_COLUMN, TEXT_COLUMN};
use crate::domain::traits::TableSource;
use crate::infra::config::FeatureParams;
use crate::ml::vectorizer::TfidfVectorizer;

pub const STAGE_NAME: &str = "feature_engineering";

pub struct FeaturesUseCase;

impl Stage for FeaturesUseCase {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn execute(&self, ctx: &StageContext<'_>) -> PipelineResult<()> {
        let cfg = FeatureParams::from_params(&ctx.params()?)?;

        let train_path = ctx.layout.interim_partition(Partition::Train);
        let test_path  = ctx.layout.interim_partition(Partition::Test);
        let train = CsvLoader::new(&train_path).load()?;
        let test  = CsvLoader::new(&test_path).load()?;

        let (train_matrix, test_matrix) =
            build_features(&train, &test, cfg.max_features, (&train_path, &test_path))?;

        for (part, matrix) in [(Partition::Train, &train_matrix), (Partition::Test, &test_matrix)] {
            let path = ctx.layout.features_partition(part);
            write_feature_matrix(matrix, &path)?;
            tracing::info!(
                "Wrote {} matrix {} x {} (+ label) to '{}'",
                part,
                matrix.n_rows(),
                matrix.n_features(),
                path.display()
            );
        }
        Ok(())
    }
}

/// Fit on train, transform both. `sources` only feeds error messages.
pub fn build_features(
    train:        &Table,
    test:         &Table,
    max_features: usize,
    sources:      (&Path, &Path),
) -> PipelineResult<(FeatureMatrix, FeatureMatrix)> {
    let (train_text, train_labels) = text_and_labels(train, sources.0)?;
    let (test_text, test_labels)   = text_and_labels(test, sources.1)?;

    let fitted = TfidfVectorizer::new(max_features).fit(&train_text)?;
    tracing::info!(
        "TF-IDF vocabulary: {} terms (max_features={})",
        fitted.n_features(),
        max_features
    );
    tracing::debug!("Vocabulary: {:?}", fitted.vocabulary());

    let names = fitted.vocabulary().to_vec();
    let train_matrix = FeatureMatrix::new(names.clone(), fitted.transform(&train_text), train_labels)?;
    let test_matrix  = FeatureMatrix::new(names, fitted.transform(&test_text), test_labels)?;
    Ok((train_matrix, test_matrix))
}

fn text_and_labels(table: &Table, source: &Path) -> PipelineResult<(Vec<String>, Vec<usize>)> {
    let context = source.display().to_string();
    let text   = table.column_index(TEXT_COLUMN, &context)?;
    let target = table.column_index(TARGET_COLUMN, &context)?;

    let docs: Vec<String> = table.column_values(text).map(str::to_string).collect();
    let labels = table
        .column_values(target)
        .enumerate()
        .map(|(row, v)| {
            v.trim().parse::<usize>().map_err(|_| {
                PipelineError::parse(source, format!("row {}: label '{v}' is not a class index", row + 1))
            })
        })
        .collect::<PipelineResult<Vec<usize>>>()?;
    Ok((docs, labels))
}
