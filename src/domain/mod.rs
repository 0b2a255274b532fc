// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain structs, enums and traits that define what the
// pipeline moves around between stages.
//
// Rules for this layer:
//   - NO file I/O
//   - NO ML algorithms
//   - Only data types, invariants checked at construction,
//     and the traits other layers implement

// The closed set of failure kinds
pub mod error;

// Dataset partitions (raw and processed)
pub mod table;

// Numeric features + encoded labels
pub mod feature_matrix;

// Evaluation scores
pub mod metrics;

// Abstractions implemented by the ml layer
pub mod traits;
