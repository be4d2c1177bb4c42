//! CART regression tree

use crate::error::{ForecastError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 12,
            min_samples_split: 10,
            min_samples_leaf: 5,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Regression tree grown by variance reduction
#[derive(Debug, Clone)]
pub struct DecisionTreeRegressor {
    config: TreeConfig,
    root: Option<Node>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl DecisionTreeRegressor {
    /// Create an unfitted tree
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Fit on the rows of `x` selected by `sample`. Indices may repeat, which is
    /// how bootstrap samples are passed in.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64], sample: &[usize]) -> Result<()> {
        if sample.is_empty() {
            return Err(ForecastError::ModelFit(
                "Cannot fit a tree on an empty sample".to_string(),
            ));
        }
        if x.len() != y.len() {
            return Err(ForecastError::ModelFit(format!(
                "Feature rows ({}) and targets ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        if let Some(&bad) = sample.iter().find(|&&i| i >= x.len()) {
            return Err(ForecastError::ModelFit(format!(
                "Sample index {} out of range for {} rows",
                bad,
                x.len()
            )));
        }

        self.n_features = x[sample[0]].len();
        if x.iter().any(|row| row.len() != self.n_features) {
            return Err(ForecastError::ModelFit(
                "Feature rows have inconsistent widths".to_string(),
            ));
        }
        self.feature_importances = vec![0.0; self.n_features];

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let root = self.build(x, y, sample.to_vec(), 0, &mut rng);
        self.root = Some(root);

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for importance in &mut self.feature_importances {
                *importance /= total;
            }
        }

        Ok(())
    }

    fn build(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: Vec<usize>,
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let mean = sum / n as f64;
        let sse: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || sse <= f64::EPSILON * f64::EPSILON
        {
            return Node::Leaf { value: mean };
        }

        let Some(best) = self.find_best_split(x, y, &indices, sse, rng) else {
            return Node::Leaf { value: mean };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[i][best.feature] <= best.threshold);
        if left.is_empty() || right.is_empty() {
            return Node::Leaf { value: mean };
        }

        self.feature_importances[best.feature] += best.gain;

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(x, y, left, depth + 1, rng)),
            right: Box::new(self.build(x, y, right, depth + 1, rng)),
        }
    }

    /// Scan each candidate feature in sorted order, tracking left and right
    /// sums so every threshold is scored in one pass.
    fn find_best_split(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
        parent_sse: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);

        let mut candidates: Vec<usize> = (0..self.n_features).collect();
        if let Some(k) = self.config.max_features {
            if k < self.n_features {
                candidates.shuffle(rng);
                candidates.truncate(k.max(1));
            }
        }

        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();

        let mut best: Option<BestSplit> = None;
        let mut sorted = indices.to_vec();

        for &feature in &candidates {
            sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let moved = y[sorted[k - 1]];
                left_sum += moved;
                left_sq += moved * moved;

                if k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let lower = x[sorted[k - 1]][feature];
                let upper = x[sorted[k]][feature];
                if lower >= upper {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / k as f64;
                let right_sse = right_sq - right_sum * right_sum / (n - k) as f64;
                let gain = parent_sse - (left_sse + right_sse);

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: lower + (upper - lower) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Predict a single row
    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        let mut node = self.root.as_ref().ok_or_else(|| {
            ForecastError::ModelFit("Tree has not been fitted".to_string())
        })?;
        if features.len() != self.n_features {
            return Err(ForecastError::InvalidParameter(format!(
                "Expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        loop {
            match node {
                Node::Leaf { value } => return Ok(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Normalized variance reduction attributed to each feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Depth of the fitted tree (a single leaf has depth 0)
    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        self.root.as_ref().map_or(0, depth_of)
    }
}
