//! Isolation forest anomaly scoring
//!
//! An ensemble of randomized binary partition trees. Points that can be
//! separated from the rest of a subsample in few random splits receive high
//! scores; points buried in dense regions need many splits and score low.

use ndarray::{Array2, ArrayView1};
use rand::prelude::*;
use rayon::prelude::*;

use crate::data::N_FEATURES;

/// Euler-Mascheroni constant, used in the harmonic-number approximation
const EULER_GAMMA: f64 = 0.5772156649;

/// Average path length of an unsuccessful search in a binary search tree
/// over `m` points: c(m) = 2*H(m-1) - 2*(m-1)/m, with H(i) ~ ln(i) + gamma.
///
/// Used both as the residual depth credited to leaves holding more than one
/// point and as the normalization constant for the final score.
pub fn average_path_length(m: usize) -> f64 {
    if m <= 1 {
        return 0.0;
    }
    let m = m as f64;
    2.0 * ((m - 1.0).ln() + EULER_GAMMA) - 2.0 * (m - 1.0) / m
}

/// Derive the rng seed for tree `i` from the forest seed.
///
/// splitmix64 finalizer; per-tree seeds must depend only on (seed, i) so the
/// forest is reproducible regardless of how tree construction is scheduled.
fn tree_seed(seed: u64, i: u64) -> u64 {
    let mut z = seed.wrapping_add(i.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Tree node in the per-tree arena
#[derive(Debug, Clone)]
enum Node {
    /// Internal split: rows with feature value <= threshold go left
    Split {
        feature: usize,
        threshold: f64,
        left: u32,
        right: u32,
    },
    /// Leaf: `residual` is c(size), the expected remaining depth for the
    /// rows that terminated here
    Leaf { residual: f64 },
}

/// A single isolation tree over a subsample of row indices.
///
/// Nodes live in a flat arena indexed by integer id; the tree is immutable
/// after construction and owned by the forest that built it.
#[derive(Debug, Clone)]
pub struct IsolationTree {
    nodes: Vec<Node>,
    root: u32,
}

impl IsolationTree {
    /// Grow a tree over `indices` (row indices into `x`), splitting until
    /// subsets are singletons or `max_depth` is reached.
    pub fn fit(x: &Array2<f64>, indices: &[usize], max_depth: usize, rng: &mut StdRng) -> Self {
        let mut nodes = Vec::new();
        let root = Self::grow(&mut nodes, x, indices, 0, max_depth, rng);
        Self { nodes, root }
    }

    fn grow(
        nodes: &mut Vec<Node>,
        x: &Array2<f64>,
        indices: &[usize],
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> u32 {
        if indices.len() <= 1 || depth >= max_depth {
            return Self::push_leaf(nodes, indices.len());
        }

        // Draw a feature uniformly; a feature that is constant over this
        // subset cannot separate anything, so discard it and redraw from the
        // remaining candidates. All four constant means the subset is
        // point-identical in feature space: leaf out with the full size.
        let mut candidates: Vec<usize> = (0..N_FEATURES).collect();
        let (feature, min_val, max_val) = loop {
            if candidates.is_empty() {
                return Self::push_leaf(nodes, indices.len());
            }
            let pick = rng.gen_range(0..candidates.len());
            let feature = candidates.swap_remove(pick);

            let mut min_val = f64::INFINITY;
            let mut max_val = f64::NEG_INFINITY;
            for &i in indices {
                let v = x[[i, feature]];
                min_val = min_val.min(v);
                max_val = max_val.max(v);
            }
            if min_val < max_val {
                break (feature, min_val, max_val);
            }
        };

        // Uniform in (min, max); min itself may be drawn, which still leaves
        // both halves non-empty under the <= / > partition below.
        let threshold = rng.gen_range(min_val..max_val);

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature]] <= threshold);

        let left = Self::grow(nodes, x, &left_indices, depth + 1, max_depth, rng);
        let right = Self::grow(nodes, x, &right_indices, depth + 1, max_depth, rng);

        nodes.push(Node::Split {
            feature,
            threshold,
            left,
            right,
        });
        (nodes.len() - 1) as u32
    }

    fn push_leaf(nodes: &mut Vec<Node>, size: usize) -> u32 {
        nodes.push(Node::Leaf {
            residual: average_path_length(size),
        });
        (nodes.len() - 1) as u32
    }

    /// Path length for an arbitrary row: one per internal node traversed
    /// plus the leaf's residual. Defined for rows never seen during
    /// construction (scoring runs over the full batch while trees subsample).
    pub fn path_length(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = self.root as usize;
        let mut depth = 0.0;
        loop {
            match &self.nodes[node] {
                Node::Leaf { residual } => return depth + residual,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                    depth += 1.0;
                }
            }
        }
    }

    /// Number of arena nodes (internal + leaves)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Isolation forest: independently built trees over independent subsamples.
///
/// Built once per detection call and dropped after scoring; there is no
/// cross-batch state.
#[derive(Debug)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    subsample_size: usize,
}

impl IsolationForest {
    /// Build `n_trees` trees over `x`.
    ///
    /// Each tree draws its own subsample of `max_samples.min(n)` row indices
    /// without replacement (the full index set when the cap covers the
    /// batch) using an rng seeded from `tree_seed(seed, i)`, so the result
    /// is identical whether trees are built in parallel or sequentially.
    pub fn fit(x: &Array2<f64>, n_trees: usize, max_samples: usize, seed: u64) -> Self {
        let n = x.nrows();
        let psi = max_samples.min(n).max(1);
        let max_depth = (psi as f64).log2().ceil() as usize;

        let trees: Vec<IsolationTree> = (0..n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(tree_seed(seed, i as u64));
                let indices: Vec<usize> = if psi < n {
                    rand::seq::index::sample(&mut rng, n, psi).into_vec()
                } else {
                    (0..n).collect()
                };
                IsolationTree::fit(x, &indices, max_depth, &mut rng)
            })
            .collect();

        Self {
            trees,
            subsample_size: psi,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn subsample_size(&self) -> usize {
        self.subsample_size
    }

    /// Anomaly score per row: s(x) = 2^(-E[h(x)] / c(psi)).
    ///
    /// Scores live in (0, 1]: ~0.5 for typical points, toward 1 for points
    /// isolated in very few splits, toward 0 for deeply embedded points.
    /// With a single-row subsample c(psi) is zero and no isolation
    /// information exists, so every row scores a flat 0.5.
    pub fn score(&self, x: &Array2<f64>) -> Vec<f64> {
        let c_psi = average_path_length(self.subsample_size);
        let n_trees = self.trees.len() as f64;

        (0..x.nrows())
            .into_par_iter()
            .map(|row_idx| {
                let row = x.row(row_idx);
                if c_psi <= 0.0 {
                    return 0.5;
                }
                let mean_path: f64 = self
                    .trees
                    .iter()
                    .map(|tree| tree.path_length(row))
                    .sum::<f64>()
                    / n_trees;
                2.0_f64.powf(-mean_path / c_psi)
            })
            .collect()
    }
}
