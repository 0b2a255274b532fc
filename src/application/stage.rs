// ============================================================
// Layer 2 — Stage Contract
// ============================================================
// Every pipeline stage follows the same shape:
//
//   1. Load params.yaml and validate its own section
//   2. Read its inputs from the files the previous stage wrote
//   3. Transform in memory, validating everything
//   4. Write its outputs; nothing is written on failure
//
// `run_stage` wraps a stage in its component span so every
// log line (including the failure) lands in that stage's file.

use std::path::PathBuf;
use std::time::Instant;

use crate::domain::error::PipelineResult;
use crate::infra::config::Params;
use crate::infra::layout::ProjectLayout;
use crate::infra::run_logger::RunLogger;

/// What a stage gets to see of the outside world
pub struct StageContext<'a> {
    pub layout:      &'a ProjectLayout,
    pub params_path: PathBuf,
    pub logger:      &'a RunLogger,
}

impl<'a> StageContext<'a> {
    /// Context reading `<root>/params.yaml`
    pub fn new(layout: &'a ProjectLayout, logger: &'a RunLogger) -> Self {
        Self { layout, params_path: layout.params_file(), logger }
    }

    pub fn with_params(mut self, path: impl Into<PathBuf>) -> Self {
        self.params_path = path.into();
        self
    }

    /// Fresh read of the params file; stages never share a parsed copy
    pub fn params(&self) -> PipelineResult<Params> {
        let params = Params::load(&self.params_path)?;
        tracing::debug!("Loaded params from '{}'", params.path().display());
        Ok(params)
    }
}

pub trait Stage {
    /// Component name, also the stage's log file name
    fn name(&self) -> &'static str;

    fn execute(&self, ctx: &StageContext<'_>) -> PipelineResult<()>;
}

/// Run one stage inside its component span, logging the outcome
pub fn run_stage(stage: &dyn Stage, ctx: &StageContext<'_>) -> PipelineResult<()> {
    let span = ctx.logger.component(stage.name());
    let _guard = span.enter();

    tracing::info!("Stage '{}' started", stage.name());
    let started = Instant::now();

    match stage.execute(ctx) {
        Ok(()) => {
            tracing::info!("Stage '{}' finished in {:.2?}", stage.name(), started.elapsed());
            Ok(())
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), "Stage '{}' failed: {}", stage.name(), e);
            Err(e)
        }
    }
}
