//! Random Forest
//!
//! In-crate trainable decision model: Gini-split decision trees over the
//! vectorized feature matrix, bagged with bootstrap sampling and
//! per-split feature subsampling. Fully deterministic for a given seed,
//! which keeps retraining reproducible end to end.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

// ============================================================================
// HYPERPARAMETERS
// ============================================================================

/// Tunable forest hyperparameters (the retrainer grid-searches these)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    /// `None` grows trees until pure or out of samples
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

// ============================================================================
// DECISION TREE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TreeNode {
    Leaf {
        proba: f32,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, row: &[f32]) -> f32 {
        match self {
            TreeNode::Leaf { proba } => *proba,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let value = row.get(*feature).copied().unwrap_or(0.0);
                if value <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }

    fn grow(
        x: &Array2<f32>,
        y: &[f32],
        indices: &[usize],
        depth: usize,
        params: &ForestParams,
        n_subfeatures: usize,
        rng: &mut StdRng,
    ) -> TreeNode {
        let n = indices.len();
        let pos = indices.iter().filter(|&&i| y[i] > 0.5).count();
        let proba = if n == 0 {
            0.5
        } else {
            pos as f32 / n as f32
        };

        let depth_reached = params.max_depth.map_or(false, |d| depth >= d);
        if n < params.min_samples_split || pos == 0 || pos == n || depth_reached {
            return TreeNode::Leaf { proba };
        }

        // Random feature subset for this split
        let mut features: Vec<usize> = (0..x.ncols()).collect();
        features.shuffle(rng);
        features.truncate(n_subfeatures.max(1));

        let mut best: Option<(usize, f32, f64)> = None;
        for &feature in &features {
            let mut vals: Vec<(f32, bool)> = indices
                .iter()
                .map(|&i| (x[[i, feature]], y[i] > 0.5))
                .collect();
            vals.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left_pos = 0usize;
            for split_at in 1..n {
                if vals[split_at - 1].1 {
                    left_pos += 1;
                }
                // No threshold exists between equal values
                if vals[split_at].0 <= vals[split_at - 1].0 {
                    continue;
                }

                let left_n = split_at;
                let right_n = n - split_at;
                let right_pos = pos - left_pos;
                let impurity = weighted_gini(left_pos, left_n, right_pos, right_n);

                if best.map_or(true, |(_, _, current)| impurity < current) {
                    let threshold = (vals[split_at - 1].0 + vals[split_at].0) / 2.0;
                    best = Some((feature, threshold, impurity));
                }
            }
        }

        match best {
            None => TreeNode::Leaf { proba },
            Some((feature, threshold, _)) => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .copied()
                    .partition(|&i| x[[i, feature]] <= threshold);
                if left_idx.is_empty() || right_idx.is_empty() {
                    return TreeNode::Leaf { proba };
                }

                TreeNode::Split {
                    feature,
                    threshold,
                    left: Box::new(TreeNode::grow(
                        x, y, &left_idx, depth + 1, params, n_subfeatures, rng,
                    )),
                    right: Box::new(TreeNode::grow(
                        x, y, &right_idx, depth + 1, params, n_subfeatures, rng,
                    )),
                }
            }
        }
    }
}

fn weighted_gini(left_pos: usize, left_n: usize, right_pos: usize, right_n: usize) -> f64 {
    let gini = |p: usize, n: usize| -> f64 {
        if n == 0 {
            return 0.0;
        }
        let q = p as f64 / n as f64;
        1.0 - q * q - (1.0 - q) * (1.0 - q)
    };

    let total = (left_n + right_n) as f64;
    gini(left_pos, left_n) * left_n as f64 / total + gini(right_pos, right_n) * right_n as f64 / total
}

// ============================================================================
// FOREST
// ============================================================================

/// Bagged decision-tree ensemble with probability output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub params: ForestParams,
    pub n_features: usize,
    trees: Vec<TreeNode>,
}

impl RandomForest {
    /// Fit on a dense matrix (rows = examples) and 0/1 targets.
    /// Deterministic for a given seed.
    pub fn fit(x: &Array2<f32>, y: &[f32], params: ForestParams, seed: u64) -> Self {
        assert_eq!(x.nrows(), y.len(), "matrix rows must match targets");

        let n = x.nrows();
        let n_features = x.ncols();
        let n_subfeatures = (n_features as f64).sqrt().round().max(1.0) as usize;

        let mut master = StdRng::seed_from_u64(seed);
        let trees = (0..params.n_trees)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(master.gen());
                // Bootstrap sample with replacement
                let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                TreeNode::grow(x, y, &indices, 0, &params, n_subfeatures, &mut rng)
            })
            .collect();

        Self {
            params,
            n_features,
            trees,
        }
    }

    /// Probability of the positive (phishing) class: mean leaf estimate
    pub fn predict_proba(&self, row: &[f32]) -> f32 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let sum: f32 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f32
    }

    /// Hard 0/1 prediction at the 0.5 boundary
    pub fn predict(&self, row: &[f32]) -> bool {
        self.predict_proba(row) >= 0.5
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated clusters on the first feature
    fn toy_data() -> (Array2<f32>, Vec<f32>) {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f32 * 0.01;
            rows.push(vec![0.1 + jitter, 1.0 - jitter]);
            y.push(0.0);
            rows.push(vec![0.9 - jitter, 0.2 + jitter]);
            y.push(1.0);
        }
        let n = rows.len();
        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        (Array2::from_shape_vec((n, 2), flat).unwrap(), y)
    }

    #[test]
    fn test_fit_separates_classes() {
        let (x, y) = toy_data();
        let forest = RandomForest::fit(&x, &y, ForestParams::default(), 42);

        assert!(forest.predict_proba(&[0.1, 1.0]) < 0.5);
        assert!(forest.predict_proba(&[0.9, 0.2]) > 0.5);
        assert!(!forest.predict(&[0.1, 1.0]));
        assert!(forest.predict(&[0.9, 0.2]));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = toy_data();
        let a = RandomForest::fit(&x, &y, ForestParams::default(), 7);
        let b = RandomForest::fit(&x, &y, ForestParams::default(), 7);

        for row in [[0.3, 0.8], [0.7, 0.4], [0.5, 0.5]] {
            assert_eq!(a.predict_proba(&row), b.predict_proba(&row));
        }
    }

    #[test]
    fn test_max_depth_limits_tree() {
        let (x, y) = toy_data();
        let params = ForestParams {
            n_trees: 10,
            max_depth: Some(1),
            min_samples_split: 2,
        };
        let forest = RandomForest::fit(&x, &y, params, 1);
        // Even a depth-1 forest separates this data
        assert!(forest.predict(&[0.95, 0.1]));
        assert!(!forest.predict(&[0.05, 0.9]));
    }

    #[test]
    fn test_single_class_yields_constant_proba() {
        let x = Array2::from_shape_vec((4, 1), vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let y = vec![1.0, 1.0, 1.0, 1.0];
        let forest = RandomForest::fit(&x, &y, ForestParams::default(), 3);
        assert_eq!(forest.predict_proba(&[0.25]), 1.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let (x, y) = toy_data();
        let params = ForestParams {
            n_trees: 5,
            max_depth: Some(3),
            min_samples_split: 2,
        };
        let forest = RandomForest::fit(&x, &y, params, 11);

        let json = serde_json::to_string(&forest).unwrap();
        let back: RandomForest = serde_json::from_str(&json).unwrap();

        assert_eq!(back.n_trees(), forest.n_trees());
        assert_eq!(back.predict_proba(&[0.6, 0.6]), forest.predict_proba(&[0.6, 0.6]));
    }
}
