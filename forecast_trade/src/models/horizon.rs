//! One independently trained model per forecast horizon

use super::random_forest::{ForestConfig, RandomForestRegressor};
use super::scaler::StandardScaler;
use crate::error::{ForecastError, Result};
use crate::features::FeatureTable;
use log::debug;

/// Feature rows paired with the return observed `horizon` bars later
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    /// Unscaled feature rows
    pub features: Vec<Vec<f64>>,
    /// Fractional return from the row's close to the close `horizon` bars on
    pub targets: Vec<f64>,
}

impl TrainingSet {
    /// Align every row of `table` with its forward return over `closes`.
    ///
    /// Rows whose target bar lies past the end of the series are left out.
    pub fn align(table: &FeatureTable, closes: &[f64], horizon: usize) -> Self {
        let mut set = TrainingSet::default();
        for row in table.rows() {
            let Some(&future) = closes.get(row.index + horizon) else {
                continue;
            };
            let current = closes[row.index];
            set.features.push(row.values.clone());
            set.targets.push((future - current) / current);
        }
        set
    }

    /// Number of training pairs
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether there are no training pairs
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Scaler and forest fitted for a single horizon
#[derive(Debug, Clone)]
pub struct TrainedHorizonModel {
    horizon: usize,
    scaler: StandardScaler,
    forest: RandomForestRegressor,
    training_rows: usize,
}

impl TrainedHorizonModel {
    /// Trading days ahead this model predicts
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Number of pairs the model was trained on
    pub fn training_rows(&self) -> usize {
        self.training_rows
    }

    /// Feature importances of the underlying forest
    pub fn feature_importances(&self) -> &[f64] {
        self.forest.feature_importances()
    }

    /// Predicted fractional return for an unscaled feature row
    pub fn predict_return(&self, features: &[f64]) -> Result<f64> {
        let scaled = self.scaler.transform_row(features)?;
        self.forest.predict_one(&scaled)
    }
}

/// Fits [`TrainedHorizonModel`]s from a feature table
#[derive(Debug, Clone, Default)]
pub struct HorizonModelTrainer {
    forest: ForestConfig,
}

impl HorizonModelTrainer {
    /// Create a trainer with fixed forest hyperparameters
    pub fn new(forest: ForestConfig) -> Self {
        Self { forest }
    }

    /// Train the model for one horizon
    pub fn train(
        &self,
        table: &FeatureTable,
        closes: &[f64],
        horizon: usize,
    ) -> Result<TrainedHorizonModel> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be at least 1".to_string(),
            ));
        }

        let set = TrainingSet::align(table, closes, horizon);
        if set.is_empty() {
            return Err(ForecastError::InsufficientData(format!(
                "No training rows for horizon {} ({} feature rows, {} bars)",
                horizon,
                table.len(),
                closes.len()
            )));
        }
        if set.targets.iter().any(|t| !t.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "Non-finite target for horizon {}",
                horizon
            )));
        }
        let first = set.targets[0];
        if set.len() > 1 && set.targets.iter().all(|&t| t == first) {
            return Err(ForecastError::ModelFit(format!(
                "Target for horizon {} is constant ({})",
                horizon, first
            )));
        }

        let scaler = StandardScaler::fit(&set.features)?;
        let scaled = scaler.transform(&set.features)?;
        let mut forest = RandomForestRegressor::new(self.forest.clone());
        forest.fit(&scaled, &set.targets)?;

        debug!(
            "Trained horizon {} on {} rows with {} trees",
            horizon,
            set.len(),
            forest.n_trees()
        );

        Ok(TrainedHorizonModel {
            horizon,
            scaler,
            forest,
            training_rows: set.len(),
        })
    }

    /// Train one model per horizon, in the order given
    pub fn train_all(
        &self,
        table: &FeatureTable,
        closes: &[f64],
        horizons: &[usize],
    ) -> Result<Vec<TrainedHorizonModel>> {
        horizons
            .iter()
            .map(|&h| self.train(table, closes, h))
            .collect()
    }
}
