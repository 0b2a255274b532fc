// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, finds the project root, starts
// the run logger and hands off to Layer 2.
//
//   sms-spam-pipeline [--root DIR] [--params FILE] [COMMAND]
//
// COMMAND is one of ingest, preprocess, features, train,
// evaluate or run (the default).

pub mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Commands;

use crate::application::pipeline_use_case::PipelineUseCase;
use crate::application::stage::{run_stage, StageContext};
use crate::infra::layout::ProjectLayout;
use crate::infra::run_logger::RunLogger;

#[derive(Parser, Debug)]
#[command(
    name = "sms-spam-pipeline",
    version,
    about = "Train and evaluate an SMS spam classifier as a staged, file-based pipeline."
)]
pub struct Cli {
    /// Project root (default: nearest ancestor with .git, Cargo.lock, dvc.yaml or params.yaml)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Params file (default: <root>/params.yaml)
    #[arg(long, global = true)]
    pub params: Option<PathBuf>,

    /// Stage to run; the whole pipeline when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let layout = match &self.root {
            Some(root) => ProjectLayout::new(root),
            None => {
                let cwd = std::env::current_dir().context("cannot read the working directory")?;
                ProjectLayout::discover(&cwd)
            }
        };

        let logger = RunLogger::start(&layout.logs_dir());
        tracing::info!("Project root: '{}'", layout.root().display());

        let mut ctx = StageContext::new(&layout, &logger);
        if let Some(params) = &self.params {
            ctx = ctx.with_params(params);
        }

        match self.command.unwrap_or(Commands::Run).stage() {
            Some(stage) => run_stage(stage.as_ref(), &ctx)
                .with_context(|| format!("stage '{}' failed", stage.name()))?,
            None => PipelineUseCase::new()
                .execute(&ctx)
                .context("pipeline failed")?,
        }
        Ok(())
    }
}
