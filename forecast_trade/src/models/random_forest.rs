//! Bootstrap-aggregated regression forest

use super::decision_tree::{DecisionTreeRegressor, TreeConfig};
use crate::error::{ForecastError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random Forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            max_depth: 12,
            min_samples_split: 10,
            min_samples_leaf: 5,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    /// Reject hyperparameters that cannot grow a forest
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(ForecastError::Config(
                "Forest needs at least one tree".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(ForecastError::Config(
                "max_depth must be positive".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForecastError::Config(
                "min_samples_leaf must be positive".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ForecastError::Config(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.max_features == Some(0) {
            return Err(ForecastError::Config(
                "max_features must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn tree_config(&self, index: usize) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            seed: self.tree_seed(index),
        }
    }

    fn tree_seed(&self, index: usize) -> u64 {
        self.seed.wrapping_add(index as u64)
    }
}

/// Random Forest regressor
///
/// Tree `i` draws its bootstrap sample and its feature subsets from a generator
/// seeded with `seed + i`, so a fit is reproducible whatever order the trees are
/// grown in.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<DecisionTreeRegressor>,
    feature_importances: Vec<f64>,
}

impl RandomForestRegressor {
    /// Create an unfitted forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Forest configuration
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Train the forest. Trees are grown in parallel.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.config.validate()?;
        if x.is_empty() {
            return Err(ForecastError::ModelFit(
                "Cannot fit a forest on zero rows".to_string(),
            ));
        }

        let n = x.len();
        let config = &self.config;
        let trees = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let sample: Vec<usize> = if config.bootstrap {
                    let mut rng = ChaCha8Rng::seed_from_u64(config.tree_seed(i));
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                let mut tree = DecisionTreeRegressor::new(config.tree_config(i));
                tree.fit(x, y, &sample)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        let n_features = x[0].len();
        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (total, imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *total += imp;
            }
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }

        self.trees = trees;
        self.feature_importances = importances;
        Ok(())
    }

    /// Mean of the tree predictions for one row
    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(ForecastError::ModelFit(
                "Forest has not been fitted".to_string(),
            ));
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.predict_one(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Normalized importance of each feature across the forest
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}
