// ============================================================
// Layer 1 — CLI Commands
// ============================================================
// One subcommand per stage plus `run` for the whole pipeline.
// Running with no subcommand is the same as `run`.

use clap::Subcommand;

use crate::application::evaluate_use_case::EvaluateUseCase;
use crate::application::features_use_case::FeaturesUseCase;
use crate::application::ingest_use_case::IngestUseCase;
use crate::application::preprocess_use_case::PreprocessUseCase;
use crate::application::stage::Stage;
use crate::application::train_use_case::TrainUseCase;

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Load the raw CSV, normalise columns, write the train/test split
    Ingest,

    /// Clean text and encode labels
    Preprocess,

    /// Fit TF-IDF on train text and vectorise both partitions
    Features,

    /// Fit the random forest and save models/model.pkl
    Train,

    /// Score the saved model on the test partition
    Evaluate,

    /// Run every stage in order
    Run,
}

impl Commands {
    /// The single stage behind this command, or None for `run`
    pub fn stage(self) -> Option<Box<dyn Stage>> {
        match self {
            Commands::Ingest     => Some(Box::new(IngestUseCase)),
            Commands::Preprocess => Some(Box::new(PreprocessUseCase)),
            Commands::Features   => Some(Box::new(FeaturesUseCase)),
            Commands::Train      => Some(Box::new(TrainUseCase)),
            Commands::Evaluate   => Some(Box::new(EvaluateUseCase)),
            Commands::Run        => None,
        }
    }
}
