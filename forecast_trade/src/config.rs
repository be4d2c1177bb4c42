//! Pipeline configuration
//!
//! Everything the pipeline needs is passed in through [`PipelineConfig`] when it
//! is constructed. Values can be loaded from TOML; keys that are left out take
//! their defaults.
//!
//! ```toml
//! horizons = [1, 2, 3, 4, 5, 6, 7]
//! period = "10y"
//! feature_set = "full"
//! rsi_zero_loss = "exclude"
//!
//! [forest]
//! n_trees = 300
//! max_depth = 12
//! min_samples_leaf = 5
//!
//! [noise]
//! mode = "none"
//! ```

use crate::error::{ForecastError, Result};
use crate::features::FeatureSet;
use crate::models::random_forest::ForestConfig;
use crate::providers::Period;
use serde::{Deserialize, Serialize};
use std::path::Path;
use trade_math::RsiZeroLoss;

/// Optional perturbation of predicted returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NoiseMode {
    /// Point forecasts are reported as the models produce them
    #[default]
    None,
    /// Adds `N(0, std_dev · √h)` to the predicted return of horizon `h`,
    /// drawn from a generator seeded with `seed`
    Gaussian { std_dev: f64, seed: u64 },
}

/// Configuration for [`ForecastPipeline`](crate::pipeline::ForecastPipeline)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Trading-day horizons, one model each
    pub horizons: Vec<usize>,
    /// Number of trailing observed bars reported with a forecast
    pub history_len: usize,
    /// Lookback requested from the market data provider
    pub period: Period,
    /// Which engineered features feed the models
    pub feature_set: FeatureSet,
    /// How RSI treats windows without losses
    pub rsi_zero_loss: RsiZeroLoss,
    /// Forest hyperparameters shared by every horizon
    pub forest: ForestConfig,
    /// Lowest predicted close that will be reported
    pub price_floor: f64,
    /// Opt-in noise on predicted returns
    pub noise: NoiseMode,
    /// Timeout for provider and narrative HTTP calls
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizons: (1..=7).collect(),
            history_len: 7,
            period: Period::TenYears,
            feature_set: FeatureSet::default(),
            rsi_zero_loss: RsiZeroLoss::default(),
            forest: ForestConfig::default(),
            price_floor: 0.01,
            noise: NoiseMode::None,
            request_timeout_secs: 15,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Largest configured horizon
    pub fn max_horizon(&self) -> usize {
        self.horizons.iter().copied().max().unwrap_or(0)
    }

    /// Check that the configuration describes a runnable pipeline
    pub fn validate(&self) -> Result<()> {
        if self.horizons.is_empty() {
            return Err(ForecastError::Config(
                "At least one horizon is required".to_string(),
            ));
        }
        if self.horizons[0] == 0 {
            return Err(ForecastError::Config(
                "Horizons must be at least 1".to_string(),
            ));
        }
        if self.horizons.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ForecastError::Config(format!(
                "Horizons must be strictly increasing, got {:?}",
                self.horizons
            )));
        }
        if self.history_len == 0 {
            return Err(ForecastError::Config(
                "history_len must be positive".to_string(),
            ));
        }
        if !self.price_floor.is_finite() || self.price_floor <= 0.0 {
            return Err(ForecastError::Config(format!(
                "price_floor must be positive, got {}",
                self.price_floor
            )));
        }
        if let NoiseMode::Gaussian { std_dev, .. } = self.noise {
            if !std_dev.is_finite() || std_dev < 0.0 {
                return Err(ForecastError::Config(format!(
                    "Noise std_dev must be non-negative, got {}",
                    std_dev
                )));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ForecastError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        self.forest.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.horizons, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(config.max_horizon(), 7);
    }

    #[test]
    fn test_rejects_unordered_horizons() {
        let config = PipelineConfig {
            horizons: vec![1, 3, 2],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ForecastError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_horizon() {
        let config = PipelineConfig {
            horizons: vec![0, 1],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
