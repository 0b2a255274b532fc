// ============================================================
// Layer 6 — Params Loader
// ============================================================
// Reads params.yaml into an immutable nested mapping and hands
// each stage a typed, validated view of its own section.
//
//   data_ingestion:
//     test_size: 0.2          ← required
//     random_state: 42
//   feature_engineering:
//     max_features: 50        ← required
//   model_training:           ← optional, every key defaulted
//     n_estimators: 100
//     max_features: sqrt      ← sqrt | log2 | all | <count>
//
// Failure mapping:
//   file missing               → ConfigNotFound
//   bad YAML / not a mapping   → ConfigParse
//   missing or unknown key,
//   wrong type, out of range   → ConfigInvalid
//
// A stage loads its params first, so a bad config fails the
// stage before it reads or writes anything.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::ml::random_forest::{ForestConfig, MaxFeatures};

pub const DATA_INGESTION:      &str = "data_ingestion";
pub const FEATURE_ENGINEERING: &str = "feature_engineering";
pub const MODEL_TRAINING:      &str = "model_training";

#[derive(Debug, Clone)]
pub struct Params {
    path: PathBuf,
    root: Mapping,
}

impl Params {
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PipelineError::ConfigNotFound { path: path.to_path_buf() },
            _ => PipelineError::io("read config", path, e),
        })?;
        Self::from_yaml(path, &text)
    }

    /// Parse YAML text; `path` is only used in error messages
    pub fn from_yaml(path: &Path, text: &str) -> PipelineResult<Self> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| PipelineError::ConfigParse {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;

        match value {
            Value::Mapping(root) => Ok(Self { path: path.to_path_buf(), root }),
            other => Err(PipelineError::ConfigParse {
                path:   path.to_path_buf(),
                reason: format!("top level must be a mapping, found {}", kind_of(&other)),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Nested lookup by dotted key, e.g. "data_ingestion.test_size"
    pub fn lookup(&self, dotted: &str) -> Option<&Value> {
        let mut parts = dotted.split('.');
        let first = parts.next()?;
        let mut current = self.root.get(first)?;
        for part in parts {
            current = current.as_mapping()?.get(part)?;
        }
        Some(current)
    }

    /// Deserialize one section into a typed struct
    pub fn section<T: DeserializeOwned>(&self, name: &str) -> PipelineResult<T> {
        let value = self
            .lookup(name)
            .ok_or_else(|| PipelineError::invalid(name, "section is missing"))?;
        serde_yaml::from_value(value.clone()).map_err(|e| PipelineError::invalid(name, e))
    }

    /// Like `section`, but an absent section yields the defaults
    pub fn section_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> PipelineResult<T> {
        match self.lookup(name) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(_) => self.section(name),
        }
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null        => "null",
        Value::Bool(_)     => "a boolean",
        Value::Number(_)   => "a number",
        Value::String(_)   => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_)  => "a mapping",
        Value::Tagged(_)   => "a tagged value",
    }
}

// ─── data_ingestion ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestionParams {
    #[serde(default = "default_source")]
    pub source:       String,
    pub test_size:    f64,
    #[serde(default = "default_random_state")]
    pub random_state: u64,
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
    #[serde(default = "default_label_column")]
    pub label_column: String,
    #[serde(default = "default_text_column")]
    pub text_column:  String,
}

impl IngestionParams {
    pub fn from_params(params: &Params) -> PipelineResult<Self> {
        let p: Self = params.section(DATA_INGESTION)?;
        if !(p.test_size > 0.0 && p.test_size < 1.0) {
            return Err(PipelineError::invalid(
                "data_ingestion.test_size",
                format!("must be strictly between 0 and 1, got {}", p.test_size),
            ));
        }
        Ok(p)
    }
}

fn default_source() -> String {
    "data/external/spam.csv".to_string()
}

fn default_random_state() -> u64 {
    42
}

fn default_drop_columns() -> Vec<String> {
    ["Unnamed: 2", "Unnamed: 3", "Unnamed: 4"].map(String::from).to_vec()
}

fn default_label_column() -> String {
    "v1".to_string()
}

fn default_text_column() -> String {
    "v2".to_string()
}

// ─── feature_engineering ──────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureParams {
    pub max_features: usize,
}

impl FeatureParams {
    pub fn from_params(params: &Params) -> PipelineResult<Self> {
        params.section(FEATURE_ENGINEERING)
    }
}

// ─── model_training ───────────────────────────────────────────────────────────
/// `max_features` as written in YAML: a name or a count
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MaxFeaturesSetting {
    Count(usize),
    Named(String),
}

impl Default for MaxFeaturesSetting {
    fn default() -> Self {
        Self::Named("sqrt".to_string())
    }
}

impl MaxFeaturesSetting {
    pub fn resolve(&self) -> PipelineResult<MaxFeatures> {
        match self {
            Self::Count(0) => Err(PipelineError::invalid(
                "model_training.max_features",
                "count must be at least 1",
            )),
            Self::Count(k) => Ok(MaxFeatures::Count(*k)),
            Self::Named(name) => match name.to_ascii_lowercase().as_str() {
                "sqrt" => Ok(MaxFeatures::Sqrt),
                "log2" => Ok(MaxFeatures::Log2),
                "all"  => Ok(MaxFeatures::All),
                other  => Err(PipelineError::invalid(
                    "model_training.max_features",
                    format!("expected sqrt, log2, all or a count, got '{other}'"),
                )),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingParams {
    pub n_estimators:      usize,
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    pub max_features:      MaxFeaturesSetting,
    pub bootstrap:         bool,
    pub random_state:      u64,
    /// Report training accuracy every `progress_step` trees
    pub progress_step:     Option<usize>,
}

impl Default for TrainingParams {
    fn default() -> Self {
        let forest = ForestConfig::default();
        Self {
            n_estimators:      forest.n_estimators,
            max_depth:         forest.max_depth,
            min_samples_split: forest.min_samples_split,
            min_samples_leaf:  forest.min_samples_leaf,
            max_features:      MaxFeaturesSetting::default(),
            bootstrap:         forest.bootstrap,
            random_state:      forest.random_state,
            progress_step:     None,
        }
    }
}

impl TrainingParams {
    pub fn from_params(params: &Params) -> PipelineResult<Self> {
        let p: Self = params.section_or_default(MODEL_TRAINING)?;
        if p.progress_step == Some(0) {
            return Err(PipelineError::invalid("model_training.progress_step", "must be at least 1"));
        }
        p.forest()?;
        Ok(p)
    }

    /// Validated forest hyperparameters
    pub fn forest(&self) -> PipelineResult<ForestConfig> {
        let cfg = ForestConfig {
            n_estimators:      self.n_estimators,
            max_depth:         self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf:  self.min_samples_leaf,
            max_features:      self.max_features.resolve()?,
            bootstrap:         self.bootstrap,
            random_state:      self.random_state,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Params {
        Params::from_yaml(Path::new("params.yaml"), text).unwrap()
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Params::load(&dir.path().join("params.yaml")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = Params::from_yaml(Path::new("p.yaml"), "a: [1, 2").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse { .. }));
        let err = Params::from_yaml(Path::new("p.yaml"), "- just\n- a list\n").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse { .. }));
    }

    #[test]
    fn test_dotted_lookup() {
        let p = parse("data_ingestion:\n  test_size: 0.25\n");
        assert_eq!(p.lookup("data_ingestion.test_size").and_then(Value::as_f64), Some(0.25));
        assert!(p.lookup("data_ingestion.nope").is_none());
        assert!(p.lookup("data_ingestion.test_size.deeper").is_none());
    }

    #[test]
    fn test_ingestion_defaults() {
        let p = parse("data_ingestion:\n  test_size: 0.2\n");
        let ing = IngestionParams::from_params(&p).unwrap();
        assert_eq!(ing.random_state, 42);
        assert_eq!(ing.source, "data/external/spam.csv");
        assert_eq!(ing.drop_columns.len(), 3);
        assert_eq!((ing.label_column.as_str(), ing.text_column.as_str()), ("v1", "v2"));
    }

    #[test]
    fn test_missing_required_key_is_invalid() {
        let p = parse("data_ingestion:\n  random_state: 1\n");
        let err = IngestionParams::from_params(&p).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid { .. }));

        let p = parse("other: 1\n");
        assert!(matches!(FeatureParams::from_params(&p), Err(PipelineError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let p = parse("feature_engineering:\n  max_features: 10\n  max_featurs: 20\n");
        assert!(matches!(FeatureParams::from_params(&p), Err(PipelineError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_test_size_range() {
        for bad in ["0", "1", "1.5", "-0.1"] {
            let p = parse(&format!("data_ingestion:\n  test_size: {bad}\n"));
            assert!(IngestionParams::from_params(&p).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn test_zero_max_features_passes_loader() {
        let p = parse("feature_engineering:\n  max_features: 0\n");
        assert_eq!(FeatureParams::from_params(&p).unwrap().max_features, 0);
    }

    #[test]
    fn test_training_section_is_optional() {
        let p = parse("feature_engineering:\n  max_features: 5\n");
        let t = TrainingParams::from_params(&p).unwrap();
        assert_eq!(t.forest().unwrap(), ForestConfig::default());
    }

    #[test]
    fn test_training_max_features_forms() {
        let p = parse("model_training:\n  n_estimators: 10\n  max_features: 3\n  progress_step: 5\n");
        let t = TrainingParams::from_params(&p).unwrap();
        assert_eq!(t.forest().unwrap().max_features, MaxFeatures::Count(3));
        assert_eq!(t.progress_step, Some(5));

        let p = parse("model_training:\n  max_features: log2\n");
        assert_eq!(TrainingParams::from_params(&p).unwrap().forest().unwrap().max_features, MaxFeatures::Log2);

        let p = parse("model_training:\n  max_features: half\n");
        assert!(TrainingParams::from_params(&p).is_err());
    }
}
