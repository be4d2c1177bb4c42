//! Converting per-horizon predictions into dated price forecasts

use crate::config::{NoiseMode, PipelineConfig};
use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::features::FeatureRow;
use crate::models::TrainedHorizonModel;
use crate::utils::{business_days_after, round_to_cents};
use chrono::NaiveDate;
use log::warn;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// An observed close reported alongside a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub is_prediction: bool,
}

/// A predicted close for one horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_close: f64,
}

/// Whether a combined point was observed or predicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Historical,
    Prediction,
}

/// Observed and predicted closes on one axis, for charting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedPoint {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(rename = "type")]
    pub kind: PointKind,
}

/// Recent history and forecast for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub symbol: String,
    pub historical: Vec<HistoricalPoint>,
    pub prediction: Vec<ForecastPoint>,
    pub combined: Vec<CombinedPoint>,
}

impl ForecastBundle {
    /// Assemble a bundle; `combined` is the history followed by the prediction
    pub fn new(
        symbol: impl Into<String>,
        historical: Vec<HistoricalPoint>,
        prediction: Vec<ForecastPoint>,
    ) -> Self {
        let combined = historical
            .iter()
            .map(|h| CombinedPoint {
                date: h.date,
                close: h.close,
                kind: PointKind::Historical,
            })
            .chain(prediction.iter().map(|p| CombinedPoint {
                date: p.date,
                close: p.predicted_close,
                kind: PointKind::Prediction,
            }))
            .collect();

        Self {
            symbol: symbol.into(),
            historical,
            prediction,
            combined,
        }
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Applies trained horizon models to the latest feature row
#[derive(Debug, Clone)]
pub struct ForecastSynthesizer {
    history_len: usize,
    price_floor: f64,
    noise: NoiseMode,
}

impl Default for ForecastSynthesizer {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl ForecastSynthesizer {
    /// Take history length, price floor and noise mode from the pipeline config
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            history_len: config.history_len,
            price_floor: config.price_floor,
            noise: config.noise,
        }
    }

    /// `last_close · (1 + predicted_return)` rounded to cents, never below the
    /// price floor
    pub fn predicted_close(&self, last_close: f64, predicted_return: f64) -> Result<f64> {
        let price = last_close * (1.0 + predicted_return);
        if !price.is_finite() {
            return Err(ForecastError::ModelFit(format!(
                "Non-finite predicted return {}",
                predicted_return
            )));
        }
        if price < self.price_floor {
            warn!(
                "Predicted close {:.4} is below the floor, reporting {}",
                price, self.price_floor
            );
            return Ok(round_to_cents(self.price_floor));
        }
        Ok(round_to_cents(price))
    }

    /// Predicted returns in model order, with noise applied when enabled
    pub fn predicted_returns(
        &self,
        models: &[TrainedHorizonModel],
        latest: &FeatureRow,
    ) -> Result<Vec<f64>> {
        let mut returns = models
            .iter()
            .map(|m| m.predict_return(&latest.values))
            .collect::<Result<Vec<_>>>()?;

        if let NoiseMode::Gaussian { std_dev, seed } = self.noise {
            warn!("Adding gaussian noise (std_dev {}) to predicted returns", std_dev);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for (r, model) in returns.iter_mut().zip(models) {
                let sigma = std_dev * (model.horizon() as f64).sqrt();
                let normal = Normal::new(0.0, sigma)
                    .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
                *r += normal.sample(&mut rng);
            }
        }

        Ok(returns)
    }

    /// Build the bundle: the trailing observed closes plus one dated point per
    /// model, dates rolled forward over weekends from the last observed bar
    pub fn synthesize(
        &self,
        series: &PriceSeries,
        latest: &FeatureRow,
        models: &[TrainedHorizonModel],
    ) -> Result<ForecastBundle> {
        let last_bar = series.last().ok_or_else(|| {
            ForecastError::InsufficientData("Cannot forecast an empty series".to_string())
        })?;
        if latest.date != last_bar.date {
            return Err(ForecastError::InvalidParameter(format!(
                "Prediction row is dated {}, last bar is {}",
                latest.date, last_bar.date
            )));
        }

        let max_horizon = models.iter().map(|m| m.horizon()).max().unwrap_or(0);
        let dates = business_days_after(last_bar.date, max_horizon)?;
        let returns = self.predicted_returns(models, latest)?;

        let prediction = models
            .iter()
            .zip(returns)
            .map(|(model, r)| {
                Ok(ForecastPoint {
                    date: dates[model.horizon() - 1],
                    predicted_close: self.predicted_close(last_bar.close, r)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let historical = series
            .tail(self.history_len)
            .iter()
            .map(|b| HistoricalPoint {
                date: b.date,
                close: round_to_cents(b.close),
                is_prediction: false,
            })
            .collect();

        Ok(ForecastBundle::new(series.symbol(), historical, prediction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicted_close_rounds() {
        let synth = ForecastSynthesizer::default();
        assert_eq!(synth.predicted_close(100.0, 0.012345).unwrap(), 101.23);
    }

    #[test]
    fn test_predicted_close_clamps_to_floor() {
        let synth = ForecastSynthesizer::default();
        assert_eq!(synth.predicted_close(100.0, -1.5).unwrap(), 0.01);
        assert!(synth.predicted_close(100.0, f64::NAN).is_err());
    }

    #[test]
    fn test_bundle_combined_order() {
        let d = |s: &str| s.parse::<NaiveDate>().unwrap();
        let bundle = ForecastBundle::new(
            "ABC",
            vec![HistoricalPoint {
                date: d("2024-03-08"),
                close: 10.0,
                is_prediction: false,
            }],
            vec![ForecastPoint {
                date: d("2024-03-11"),
                predicted_close: 10.5,
            }],
        );

        assert_eq!(bundle.combined.len(), 2);
        assert_eq!(bundle.combined[0].kind, PointKind::Historical);
        assert_eq!(bundle.combined[1].kind, PointKind::Prediction);
        assert_eq!(bundle.combined[1].close, 10.5);

        let json = bundle.to_json().unwrap();
        assert!(json.contains("\"type\":\"prediction\""));
        assert!(json.contains("\"date\":\"2024-03-11\""));
    }
}
