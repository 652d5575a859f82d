//! CART regression tree.
//!
//! Splits minimize the summed squared error of the two children; leaves
//! predict the mean target of the samples that reach them. Split search
//! scans each feature in sorted order with prefix sums, so one split costs
//! `O(n_features * n log n)`.

use crate::error::{PricerError, Result};
use crate::models::{check_fit_input, check_predict_input, Regressor};
use crate::selection::params::ParamSet;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A node in a fitted regression tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TreeNode {
    /// Terminal node predicting the mean of its training samples.
    Leaf { value: f64, n_samples: usize },
    /// Internal split: `feature <= threshold` goes left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Depth of the subtree rooted here; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Decision tree regressor using the CART algorithm.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    tree: Option<TreeNode>,
    n_features: usize,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    /// Create an unbounded-depth tree with default stopping parameters.
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            tree: None,
            n_features: 0,
        }
    }

    /// Limit the tree depth (root has depth 0).
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Minimum samples required to split a node (at least 2).
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Minimum samples required in each child (at least 1).
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Build from a hyperparameter set. Unknown keys are rejected.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let mut model = Self::new();
        for (name, value) in params {
            match name.as_str() {
                "max_depth" => model.max_depth = Some(value.as_usize(name)?),
                "min_samples_split" => {
                    model.min_samples_split = value.as_usize(name)?.max(2)
                }
                "min_samples_leaf" => model.min_samples_leaf = value.as_usize(name)?.max(1),
                other => {
                    return Err(PricerError::InvalidParameter(format!(
                        "decision_tree does not accept '{}'",
                        other
                    )))
                }
            }
        }
        Ok(model)
    }

    /// The fitted tree, if any.
    pub fn tree(&self) -> Option<&TreeNode> {
        self.tree.as_ref()
    }

    fn predict_one(node: &TreeNode, sample: &[f64]) -> f64 {
        let mut current = node;
        loop {
            match current {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    current = if sample[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

impl Regressor for DecisionTreeRegressor {
    fn algorithm(&self) -> &'static str {
        "decision_tree"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;
        let indices: Vec<usize> = (0..y.len()).collect();
        self.n_features = x.dim().1;
        self.tree = Some(build_tree(
            x,
            y,
            &indices,
            0,
            self.max_depth,
            self.min_samples_split,
            self.min_samples_leaf,
        ));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| PricerError::NotFitted("decision tree".to_string()))?;
        check_predict_input(x.dim().1, self.n_features)?;

        let predictions = x
            .rows()
            .into_iter()
            .map(|row| Self::predict_one(tree, &row.to_vec()))
            .collect();
        Ok(Array1::from_vec(predictions))
    }

    fn clone_unfitted(&self) -> Box<dyn Regressor> {
        let mut fresh = DecisionTreeRegressor::new()
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf);
        fresh.max_depth = self.max_depth;
        Box::new(fresh)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }
}

fn leaf(y: &Array1<f64>, indices: &[usize]) -> TreeNode {
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
    TreeNode::Leaf {
        value: mean,
        n_samples: indices.len(),
    }
}

fn variance(y: &Array1<f64>, indices: &[usize]) -> f64 {
    let n = indices.len() as f64;
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n;
    indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f64>() / n
}

fn build_tree(
    x: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
    depth: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
) -> TreeNode {
    let at_max_depth = max_depth.is_some_and(|limit| depth >= limit);
    if indices.len() < min_samples_split || at_max_depth || variance(y, indices) < 1e-12 {
        return leaf(y, indices);
    }

    let Some((feature, threshold)) = find_best_split(x, y, indices, min_samples_leaf) else {
        return leaf(y, indices);
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[[i, feature]] <= threshold);

    if left_idx.len() < min_samples_leaf || right_idx.len() < min_samples_leaf {
        return leaf(y, indices);
    }

    let left = build_tree(
        x,
        y,
        &left_idx,
        depth + 1,
        max_depth,
        min_samples_split,
        min_samples_leaf,
    );
    let right = build_tree(
        x,
        y,
        &right_idx,
        depth + 1,
        max_depth,
        min_samples_split,
        min_samples_leaf,
    );

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Best `(feature, threshold)` by summed-squared-error reduction, or
/// `None` when no split separates the samples.
fn find_best_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<(usize, f64)> {
    let n = indices.len();
    let n_features = x.dim().1;

    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;

    let mut best: Option<(usize, f64, f64)> = None; // (feature, threshold, gain)

    for feature in 0..n_features {
        let mut pairs: Vec<(f64, f64)> =
            indices.iter().map(|&i| (x[[i, feature]], y[i])).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for split_at in 1..n {
            let (value, target) = pairs[split_at - 1];
            left_sum += target;
            left_sq += target * target;

            // Only split between distinct feature values.
            if value == pairs[split_at].0 {
                continue;
            }
            if split_at < min_samples_leaf || n - split_at < min_samples_leaf {
                continue;
            }

            let left_n = split_at as f64;
            let right_n = (n - split_at) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let left_sse = left_sq - left_sum * left_sum / left_n;
            let right_sse = right_sq - right_sum * right_sum / right_n;
            let gain = parent_sse - left_sse - right_sse;

            if gain > best.map_or(1e-12, |(_, _, g)| g) {
                let threshold = (value + pairs[split_at].0) / 2.0;
                best = Some((feature, threshold, gain));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}
