// ============================================================
// Layer 5 — CART Decision Tree
// ============================================================
// A classification tree grown with Gini impurity, used as the
// base learner of the random forest.
//
// Growing a node:
//   - Stop (leaf) when the node is pure, has fewer than
//     `min_samples_split` rows, or sits at `max_depth`
//   - Otherwise visit features in a random order and evaluate
//     up to `max_features` of them that are not constant in
//     this node
//   - For each feature, sort the node's rows by value and try
//     every threshold halfway between two distinct values,
//     keeping `min_samples_leaf` rows on each side
//   - Take the split with the lowest weighted child impurity
//
// Rows go left when `value <= threshold`.
//
// Nodes live in a flat arena (Vec<Node>) and are grown with an
// explicit work stack, so deep trees never recurse.

use bincode::{Decode, Encode};
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum Node {
    Leaf {
        /// Class distribution of the training rows that reached this leaf
        proba: Vec<f64>,
    },
    Split {
        feature:   usize,
        threshold: f64,
        left:      usize,
        right:     usize,
    },
}

/// Growth limits for one tree, with `max_features` already resolved
#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    pub max_features:      usize,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct DecisionTree {
    nodes:     Vec<Node>,
    n_classes: usize,
}

struct Pending {
    node:    usize,
    rows:    Vec<usize>,
    depth:   usize,
}

struct BestSplit {
    feature:   usize,
    threshold: f64,
    impurity:  f64,
}

impl DecisionTree {
    /// Grow a tree on the rows listed in `sample`. Duplicates are
    /// allowed; a bootstrap sample lists a row several times.
    pub fn fit<R: Rng>(
        x:         &[Vec<f64>],
        y:         &[usize],
        sample:    Vec<usize>,
        n_classes: usize,
        cfg:       &TreeConfig,
        rng:       &mut R,
    ) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        let mut nodes: Vec<Node> = vec![Node::Leaf { proba: Vec::new() }];
        let mut stack = vec![Pending { node: 0, rows: sample, depth: 0 }];

        while let Some(Pending { node, rows, depth }) = stack.pop() {
            let counts   = class_counts(y, &rows, n_classes);
            let impurity = gini(&counts, rows.len());

            let can_split = impurity > 0.0
                && rows.len() >= cfg.min_samples_split
                && rows.len() >= 2 * cfg.min_samples_leaf
                && cfg.max_depth.map_or(true, |d| depth < d);

            let best = if can_split {
                best_split(x, y, &rows, n_features, n_classes, cfg, rng)
            } else {
                None
            };

            match best {
                Some(split) => {
                    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                        .iter()
                        .partition(|&&r| x[r][split.feature] <= split.threshold);

                    let left  = nodes.len();
                    let right = left + 1;
                    nodes.push(Node::Leaf { proba: Vec::new() });
                    nodes.push(Node::Leaf { proba: Vec::new() });
                    nodes[node] = Node::Split {
                        feature:   split.feature,
                        threshold: split.threshold,
                        left,
                        right,
                    };

                    stack.push(Pending { node: right, rows: right_rows, depth: depth + 1 });
                    stack.push(Pending { node: left,  rows: left_rows,  depth: depth + 1 });
                }
                None => {
                    let total = rows.len().max(1) as f64;
                    nodes[node] = Node::Leaf {
                        proba: counts.iter().map(|&c| c as f64 / total).collect(),
                    };
                }
            }
        }

        Self { nodes, n_classes }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Node::Split { left, right, .. } = self.nodes[id] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        deepest
    }

    /// Class distribution of the leaf this row lands in.
    /// Missing feature values read as 0.0.
    pub fn predict_proba_row(&self, row: &[f64]) -> &[f64] {
        let mut id = 0usize;
        loop {
            match &self.nodes[id] {
                Node::Leaf { proba } => return proba,
                Node::Split { feature, threshold, left, right } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    id = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

fn class_counts(y: &[usize], rows: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &r in rows {
        counts[y[r]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / total).powi(2)).sum::<f64>()
}

fn best_split<R: Rng>(
    x:          &[Vec<f64>],
    y:          &[usize],
    rows:       &[usize],
    n_features: usize,
    n_classes:  usize,
    cfg:        &TreeConfig,
    rng:        &mut R,
) -> Option<BestSplit> {
    use rand::seq::SliceRandom;

    let mut features: Vec<usize> = (0..n_features).collect();
    features.shuffle(rng);

    let n = rows.len();
    let mut best: Option<BestSplit> = None;
    let mut visited = 0usize;
    let mut pairs: Vec<(f64, usize)> = Vec::with_capacity(n);

    for feature in features {
        if visited >= cfg.max_features {
            break;
        }

        pairs.clear();
        pairs.extend(rows.iter().map(|&r| (x[r][feature], y[r])));
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Constant features don't count against max_features
        if pairs[0].0 == pairs[n - 1].0 {
            continue;
        }
        visited += 1;

        let mut left  = vec![0usize; n_classes];
        let mut right = vec![0usize; n_classes];
        for &(_, label) in pairs.iter() {
            right[label] += 1;
        }

        for i in 0..n - 1 {
            let label = pairs[i].1;
            left[label]  += 1;
            right[label] -= 1;

            let n_left  = i + 1;
            let n_right = n - n_left;
            if n_left < cfg.min_samples_leaf || n_right < cfg.min_samples_leaf {
                continue;
            }
            let (lo, hi) = (pairs[i].0, pairs[i + 1].0);
            if lo == hi {
                continue;
            }

            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / n as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                // Midpoint can round up to `hi` for adjacent floats
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(BestSplit { feature, threshold, impurity });
            }
        }
    }

    best
}
