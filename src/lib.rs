// ============================================================
// sms_spam_pipeline
// ============================================================
// A staged, file-based training pipeline for an SMS spam
// classifier: ingest → preprocess → features → train →
// evaluate, each stage reading what the previous one wrote.
//
// Layers:
//   1  cli          — argument parsing, entry point
//   2  application  — one use case per stage + the runner
//   3  domain       — tables, matrices, errors, traits
//   4  data         — CSV I/O, split, text cleaning, labels
//   5  ml           — TF-IDF, trees, forest, metrics
//   6  infra        — params, layout, logging, artifacts

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
