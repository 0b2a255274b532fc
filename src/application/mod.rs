// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// One use case per pipeline stage, plus the runner that
// chains them. Stages talk to each other only through the
// files listed in infra::layout.
//
// Rules for this layer:
//   - No ML math here (that's Layer 5)
//   - No CSV / JSON / bincode details (Layers 4 and 6)
//   - No printing; the CLI decides what the user sees
//   - Only workflow coordination and logging

// The shared stage contract and context
pub mod stage;

// raw source → data/raw/
pub mod ingest_use_case;

// data/raw/ → data/interim/
pub mod preprocess_use_case;

// data/interim/ → data/processed/
pub mod features_use_case;

// data/processed/train → models/
pub mod train_use_case;

// models/ + data/processed/test → reports/
pub mod evaluate_use_case;

// All five stages in order
pub mod pipeline_use_case;
