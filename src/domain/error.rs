// ============================================================
// Layer 3 — Pipeline Error Kinds
// ============================================================
// One closed set of failure kinds shared by every stage.
// Each variant carries the operation, path or column needed
// to diagnose the failure from the log alone.
//
// Stages never recover locally: they log the error inside
// their component span and hand it back to the runner,
// which stops the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library layers
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("config file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("malformed config '{}': {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("invalid config value '{key}': {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("missing column '{column}' in {context}")]
    Schema { column: String, context: String },

    #[error("bad label in {partition} partition row {row}: {reason}")]
    Label {
        partition: String,
        row:       usize,
        reason:    String,
    },

    #[error("cannot parse '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("shape mismatch in {context}: expected {expected}, found {actual}")]
    ShapeMismatch {
        context:  &'static str,
        expected: usize,
        actual:   usize,
    },

    #[error("empty vocabulary: {reason}")]
    EmptyVocabulary { reason: String },

    #[error("metric computation failed: {0}")]
    Metric(String),

    #[error("model artifact '{}': {reason}", path.display())]
    Artifact { path: PathBuf, reason: String },

    #[error("{op} failed for '{}': {source}", path.display())]
    Io {
        op:     &'static str,
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn schema(column: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Schema { column: column.into(), context: context.into() }
    }

    pub fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse { path: path.into(), reason: reason.to_string() }
    }

    pub fn invalid(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::ConfigInvalid { key: key.into(), reason: reason.to_string() }
    }

    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { op, path: path.into(), source }
    }

    /// Short stable name of the error kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "config_not_found",
            Self::ConfigParse { .. }    => "config_parse",
            Self::ConfigInvalid { .. }  => "config_invalid",
            Self::Schema { .. }         => "schema",
            Self::Label { .. }          => "label",
            Self::Parse { .. }          => "parse",
            Self::ShapeMismatch { .. }  => "shape_mismatch",
            Self::EmptyVocabulary { .. } => "empty_vocabulary",
            Self::Metric(_)             => "metric",
            Self::Artifact { .. }       => "artifact",
            Self::Io { .. }             => "io",
        }
    }
}
