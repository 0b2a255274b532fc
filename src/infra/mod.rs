// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by every stage but owned by
// none of them:
//
//   config.rs       — params.yaml loading and the typed,
//                     validated per-stage sections
//
//   layout.rs       — project root discovery and every path
//                     the pipeline reads or writes
//
//   run_logger.rs   — console logging plus one log file per
//                     stage under logs/<run-timestamp>/
//
//   model_store.rs  — bincode model artifact save / load
//
//   metrics.rs      — metrics.json and training_steps.csv
//
//   json_file.rs    — small pretty-JSON read / write helpers

/// params.yaml loader and stage sections
pub mod config;

/// Project root and file layout
pub mod layout;

/// Per-run, per-component logging
pub mod run_logger;

/// Model artifact persistence
pub mod model_store;

/// Evaluation and training-progress reports
pub mod metrics;

/// JSON read / write helpers
pub mod json_file;
