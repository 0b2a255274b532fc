// ============================================================
// Layer 2 — IngestUseCase
// ============================================================
// Raw source → data/raw/{train,test}.csv
//
//   Step 1: Load the raw CSV                 (Layer 4 - data)
//   Step 2: Drop junk columns, rename the
//           label and text columns           (Layer 3 - domain)
//   Step 3: Seeded train/test split          (Layer 4 - data)
//   Step 4: Write both partitions            (Layer 4 - data)
//
// Steps 1-3 are pure; nothing touches data/raw/ until all of
// them have succeeded.

use crate::application::stage::{Stage, StageContext};
use crate::data::loader::{write_table, CsvLoader};
use crate::data::splitter::split_indices;
use crate::domain::error::PipelineResult;
use crate::domain::table::{Partition, Table, TARGET_COLUMN, TEXT_COLUMN};
use crate::domain::traits::TableSource;
use crate::infra::config::IngestionParams;

pub const STAGE_NAME: &str = "data_ingestion";

pub struct IngestUseCase;

impl Stage for IngestUseCase {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn execute(&self, ctx: &StageContext<'_>) -> PipelineResult<()> {
        let cfg    = IngestionParams::from_params(&ctx.params()?)?;
        let source = CsvLoader::new(ctx.layout.resolve_source(&cfg.source));

        let (train, test) = ingest(&source, &cfg)?;

        for (part, table) in [(Partition::Train, &train), (Partition::Test, &test)] {
            let path = ctx.layout.raw_partition(part);
            write_table(table, &path)?;
            tracing::info!("Wrote {} {} rows to '{}'", table.len(), part, path.display());
        }
        Ok(())
    }
}

/// Load, normalise and split without writing anything
pub fn ingest(source: &dyn TableSource, cfg: &IngestionParams) -> PipelineResult<(Table, Table)> {
    tracing::info!("Loading raw data from '{}'", source.describe());
    let mut table = source.load()?;
    tracing::info!("Loaded {} rows, columns {:?}", table.len(), table.columns());

    normalize(&mut table, cfg, &source.describe())?;

    let (train_idx, test_idx) = split_indices(table.len(), cfg.test_size, cfg.random_state)?;
    let train = table.select_rows(&train_idx);
    let test  = table.select_rows(&test_idx);

    tracing::info!(
        "Split {} rows into {} train / {} test (test_size={}, seed={})",
        table.len(),
        train.len(),
        test.len(),
        cfg.test_size,
        cfg.random_state
    );
    Ok((train, test))
}

/// Drop the configured junk columns and rename the label and
/// text columns to their canonical names. Any absent column is
/// a SchemaError and leaves the table as it was.
pub fn normalize(table: &mut Table, cfg: &IngestionParams, context: &str) -> PipelineResult<()> {
    table.require_columns(&[cfg.label_column.as_str(), cfg.text_column.as_str()], context)?;
    table.drop_columns(&cfg.drop_columns, context)?;
    table.rename_column(&cfg.label_column, TARGET_COLUMN, context)?;
    table.rename_column(&cfg.text_column, TEXT_COLUMN, context)?;
    Ok(())
}
