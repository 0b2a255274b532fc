// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a raw CSV on disk and a clean table of
// normalised text with encoded labels.
//
//   spam.csv
//       │
//       ▼
//   CsvLoader      → reads CSV (UTF-8 / Latin-1), names blank headers
//       │
//       ▼
//   splitter       → seeded train/test split
//       │
//       ▼
//   Preprocessor   → lowercase, tokenise, filter, lemmatise
//       │
//       ▼
//   LabelEncoder   → sorted label → index mapping
//
// Each module is responsible for exactly one step.

/// CSV reading and writing for tables and feature matrices
pub mod loader;

/// Seeded train/test split
pub mod splitter;

/// Text normalisation
pub mod preprocessor;

/// Stop-words, punctuation and the noun lemmatizer
pub mod lexicon;

/// Deterministic label → index encoding
pub mod label_encoder;
