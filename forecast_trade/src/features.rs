//! Feature engineering from daily bars
//!
//! [`FeatureBuilder`] turns a [`PriceSeries`] into a [`FeatureTable`]: one row
//! per bar that has a defined value for every selected feature. Bars inside
//! the warm-up of any window, or where an indicator denominator is zero, get no
//! row. Nothing is imputed.

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trade_math::{
    annualized_volatility, bollinger_width, pct_change, rsi_with_policy, sma, volume_change,
    volume_ma_ratio, RsiZeroLoss,
};

/// RSI lookback in bars
pub const RSI_WINDOW: usize = 14;
/// Bollinger band lookback in bars
pub const BOLLINGER_WINDOW: usize = 20;
/// Return-volatility lookback in bars
pub const VOLATILITY_WINDOW: usize = 21;
/// Volume mean lookback in bars
pub const VOLUME_MA_WINDOW: usize = 20;

/// A single engineered feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Close `k` bars earlier
    Lag(usize),
    /// Trailing mean close over `w` bars
    MovingAverage(usize),
    /// One-bar fractional return
    Return1d,
    /// Five-bar fractional return
    Return5d,
    /// Relative strength index over [`RSI_WINDOW`] changes
    Rsi14,
    /// Bollinger width over [`BOLLINGER_WINDOW`] closes
    BollingerWidth20,
    /// Annualized return volatility over [`VOLATILITY_WINDOW`] returns
    Volatility21,
    /// `(high - low) / close` of the bar itself
    HighLowRange,
    /// Fractional change of volume against the prior bar
    VolumeChange,
    /// Volume over its [`VOLUME_MA_WINDOW`]-bar mean
    VolumeMaRatio20,
}

impl Feature {
    /// Column name
    pub fn name(&self) -> String {
        match self {
            Feature::Lag(k) => format!("lag_{}", k),
            Feature::MovingAverage(w) => format!("ma_{}", w),
            Feature::Return1d => "return_1d".to_string(),
            Feature::Return5d => "return_5d".to_string(),
            Feature::Rsi14 => "rsi_14".to_string(),
            Feature::BollingerWidth20 => "bollinger_width_20".to_string(),
            Feature::Volatility21 => "volatility_21".to_string(),
            Feature::HighLowRange => "high_low_range".to_string(),
            Feature::VolumeChange => "volume_change".to_string(),
            Feature::VolumeMaRatio20 => "volume_ma_ratio_20".to_string(),
        }
    }

    /// Index of the first bar with enough history for this feature. A missing
    /// value at or after this index comes from a zero denominator.
    pub fn warmup(&self) -> usize {
        match self {
            Feature::Lag(k) => *k,
            Feature::MovingAverage(w) => w.saturating_sub(1),
            Feature::Return1d => 1,
            Feature::Return5d => 5,
            Feature::Rsi14 => RSI_WINDOW,
            Feature::BollingerWidth20 => BOLLINGER_WINDOW - 1,
            Feature::Volatility21 => VOLATILITY_WINDOW,
            Feature::HighLowRange => 0,
            Feature::VolumeChange => 1,
            Feature::VolumeMaRatio20 => VOLUME_MA_WINDOW - 1,
        }
    }

    /// Whether the feature is computed from traded volume
    pub fn uses_volume(&self) -> bool {
        matches!(self, Feature::VolumeChange | Feature::VolumeMaRatio20)
    }

    fn column(
        &self,
        series: &PriceSeries,
        closes: &[f64],
        rsi_zero_loss: RsiZeroLoss,
    ) -> Result<Vec<Option<f64>>> {
        let column = match *self {
            Feature::Lag(k) => (0..closes.len())
                .map(|t| t.checked_sub(k).map(|i| closes[i]))
                .collect(),
            Feature::MovingAverage(w) => sma(closes, w)?,
            Feature::Return1d => pct_change(closes, 1)?,
            Feature::Return5d => pct_change(closes, 5)?,
            Feature::Rsi14 => rsi_with_policy(closes, RSI_WINDOW, rsi_zero_loss)?,
            Feature::BollingerWidth20 => bollinger_width(closes, BOLLINGER_WINDOW)?,
            Feature::Volatility21 => annualized_volatility(closes, VOLATILITY_WINDOW)?,
            Feature::HighLowRange => series
                .bars()
                .iter()
                .map(|b| Some((b.high - b.low) / b.close))
                .collect(),
            Feature::VolumeChange => volume_change(&series.volumes())?,
            Feature::VolumeMaRatio20 => volume_ma_ratio(&series.volumes(), VOLUME_MA_WINDOW)?,
        };
        Ok(column)
    }
}

const PRICE_FEATURES: [Feature; 11] = [
    Feature::Lag(1),
    Feature::Lag(2),
    Feature::Lag(3),
    Feature::Lag(4),
    Feature::Lag(5),
    Feature::MovingAverage(5),
    Feature::MovingAverage(20),
    Feature::MovingAverage(50),
    Feature::Return1d,
    Feature::Rsi14,
    Feature::BollingerWidth20,
];

const MARKET_FEATURES: [Feature; 4] = [
    Feature::Volatility21,
    Feature::HighLowRange,
    Feature::VolumeChange,
    Feature::VolumeMaRatio20,
];

/// Named selections of features
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// Lags 1-5, moving averages 5/20/50, one-bar return, RSI and Bollinger width
    Price,
    /// `Price` plus volatility, high-low range and the two volume ratios
    #[default]
    Full,
    /// `Full` plus the five-bar return
    Extended,
}

impl FeatureSet {
    /// Features in column order
    pub fn features(&self) -> Vec<Feature> {
        let mut features = PRICE_FEATURES.to_vec();
        if matches!(self, FeatureSet::Full | FeatureSet::Extended) {
            features.extend_from_slice(&MARKET_FEATURES);
        }
        if matches!(self, FeatureSet::Extended) {
            features.push(Feature::Return5d);
        }
        features
    }

    /// Bars needed before the first row can exist
    pub fn min_bars(&self) -> usize {
        self.features()
            .iter()
            .map(|f| f.warmup() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// The feature values of one bar
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Position of the bar in the source series
    pub index: usize,
    /// Bar date
    pub date: NaiveDate,
    /// Bar close
    pub close: f64,
    /// Values in [`FeatureTable::features`] order
    pub values: Vec<f64>,
}

/// Why the most recent bar does or does not have a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatestStatus {
    /// The series has no bars
    Empty,
    /// The most recent bar has a complete row
    Ready,
    /// Not enough history for at least one window
    Warmup { feature: String },
    /// A window is filled but its value is undefined
    Degenerate { feature: String },
}

/// Rows that survived windowing, oldest first
#[derive(Debug, Clone)]
pub struct FeatureTable {
    features: Vec<Feature>,
    rows: Vec<FeatureRow>,
    bar_count: usize,
    latest: LatestStatus,
    latest_date: Option<NaiveDate>,
}

impl FeatureTable {
    /// Selected features in column order
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Column names
    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(Feature::name).collect()
    }

    /// Surviving rows
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Number of surviving rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no bar produced a row
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of bars in the source series
    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    /// Status of the most recent bar
    pub fn latest_status(&self) -> &LatestStatus {
        &self.latest
    }

    /// Value of `feature` in `row`, if the feature is part of this table
    pub fn value(&self, row: &FeatureRow, feature: Feature) -> Option<f64> {
        self.features
            .iter()
            .position(|f| *f == feature)
            .and_then(|i| row.values.get(i).copied())
    }

    /// Whether the latest bar is unusable because a volume feature is
    /// undefined on it, as happens after a zero-volume bar
    pub fn latest_volume_degenerate(&self) -> bool {
        match &self.latest {
            LatestStatus::Degenerate { feature } => self
                .features
                .iter()
                .any(|f| f.uses_volume() && f.name() == *feature),
            _ => false,
        }
    }

    /// The row of the most recent bar, which every forecast is made from.
    ///
    /// Fails with `InsufficientData` when the bar is still inside a window's
    /// warm-up and with `NumericDegeneracy` when one of its values is undefined.
    pub fn prediction_row(&self) -> Result<&FeatureRow> {
        match &self.latest {
            LatestStatus::Ready => self.rows.last().ok_or_else(|| {
                ForecastError::InsufficientData("No feature rows available".to_string())
            }),
            LatestStatus::Empty => Err(ForecastError::InsufficientData(
                "Series has no bars".to_string(),
            )),
            LatestStatus::Warmup { feature } => Err(ForecastError::InsufficientData(format!(
                "{} bars are not enough history for {}",
                self.bar_count, feature
            ))),
            LatestStatus::Degenerate { feature } => Err(ForecastError::NumericDegeneracy {
                feature: feature.clone(),
                date: self.latest_date.unwrap_or_default(),
            }),
        }
    }
}

/// Builds feature tables from price series
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder {
    feature_set: FeatureSet,
    rsi_zero_loss: RsiZeroLoss,
}

impl FeatureBuilder {
    /// Create a builder for the given feature selection and RSI policy
    pub fn new(feature_set: FeatureSet, rsi_zero_loss: RsiZeroLoss) -> Self {
        Self {
            feature_set,
            rsi_zero_loss,
        }
    }

    /// Feature selection in use
    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    /// Compute every selected feature for every bar and keep the complete rows
    pub fn build(&self, series: &PriceSeries) -> Result<FeatureTable> {
        let features = self.feature_set.features();
        let closes = series.closes();

        let columns = features
            .iter()
            .map(|f| f.column(series, &closes, self.rsi_zero_loss))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::new();
        for (t, bar) in series.bars().iter().enumerate() {
            let values: Option<Vec<f64>> = columns
                .iter()
                .map(|c| c[t].filter(|v| v.is_finite()))
                .collect();
            if let Some(values) = values {
                rows.push(FeatureRow {
                    index: t,
                    date: bar.date,
                    close: bar.close,
                    values,
                });
            }
        }

        let latest = match series.len().checked_sub(1) {
            None => LatestStatus::Empty,
            Some(t) => Self::classify(&features, &columns, t),
        };

        Ok(FeatureTable {
            features,
            rows,
            bar_count: series.len(),
            latest,
            latest_date: series.last().map(|b| b.date),
        })
    }

    fn classify(features: &[Feature], columns: &[Vec<Option<f64>>], t: usize) -> LatestStatus {
        // Short history wins over a zero denominator
        if let Some(f) = features.iter().find(|f| t < f.warmup()) {
            return LatestStatus::Warmup { feature: f.name() };
        }
        match features
            .iter()
            .zip(columns)
            .find(|(_, c)| !c[t].is_some_and(f64::is_finite))
        {
            Some((f, _)) => LatestStatus::Degenerate { feature: f.name() },
            None => LatestStatus::Ready,
        }
    }
}
