//! Regression tree used by the bagged-forest and boosting models.
//!
//! Plain CART: greedy binary splits chosen by squared-error reduction,
//! bounded by depth and leaf-size hyperparameters.

use serde::{Deserialize, Serialize};

// ---

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Grow a tree over the rows of `x` selected by `indices`.
    ///
    /// `indices` may repeat rows; bootstrap samples rely on that.
    pub fn grow(x: &[Vec<f64>], y: &[f64], indices: &[usize], params: &TreeParams) -> TreeNode {
        // ---
        grow_node(x, y, indices, params, 0)
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        // ---
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if features[*feature] <= *threshold {
                    left.predict(features)
                } else {
                    right.predict(features)
                }
            }
        }
    }
}

// ---

fn grow_node(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    params: &TreeParams,
    depth: usize,
) -> TreeNode {
    // ---
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

    if depth >= params.max_depth || indices.len() < params.min_samples_split {
        return TreeNode::Leaf { value: mean };
    }

    let Some((feature, threshold)) = best_split(x, y, indices, params) else {
        return TreeNode::Leaf { value: mean };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[i][feature] <= threshold);

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(grow_node(x, y, &left_idx, params, depth + 1)),
        right: Box::new(grow_node(x, y, &right_idx, params, depth + 1)),
    }
}

/// Pick the `(feature, threshold)` pair with the lowest total squared error,
/// or `None` when no split leaves both sides at `min_samples_leaf`.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    params: &TreeParams,
) -> Option<(usize, f64)> {
    // ---
    let n_features = x.first().map(Vec::len)?;
    let n = indices.len();

    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..n_features {
        let mut ordered: Vec<(f64, f64)> = indices.iter().map(|&i| (x[i][feature], y[i])).collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Running sums from the left let each candidate split be scored in
        // O(1): SSE = Σy² - (Σy)²/n per side.
        let total_sum: f64 = ordered.iter().map(|(_, t)| t).sum();
        let total_sq: f64 = ordered.iter().map(|(_, t)| t * t).sum();

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;

        for split_at in 1..n {
            let (value, target) = ordered[split_at - 1];
            left_sum += target;
            left_sq += target * target;

            // Can't split between equal feature values.
            if ordered[split_at].0 <= value {
                continue;
            }
            if split_at < params.min_samples_leaf || n - split_at < params.min_samples_leaf {
                continue;
            }

            let left_n = split_at as f64;
            let right_n = (n - split_at) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            let improves = match best {
                None => true,
                Some((_, _, best_sse)) => sse < best_sse,
            };
            if improves {
                let threshold = (value + ordered[split_at].0) / 2.0;
                best = Some((feature, threshold, sse));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}
