// ============================================================
// Layer 5 — ML Layer
// ============================================================
// The numeric side of the pipeline. Nothing here touches the
// filesystem: functions take rows in and hand rows or models
// back out.
//
//   vectorizer.rs     — TF-IDF fitted on train text only
//
//   decision_tree.rs  — CART tree (Gini, midpoint thresholds)
//
//   random_forest.rs  — bootstrap ensemble of trees, seeded
//                       per tree, implements Classifier
//
//   metrics.rs        — accuracy / precision / recall / ROC AUC

/// TF-IDF vectorizer
pub mod vectorizer;

/// Single classification tree
pub mod decision_tree;

/// Random forest ensemble
pub mod random_forest;

/// Binary classification metrics
pub mod metrics;
