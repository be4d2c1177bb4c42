#![allow(dead_code)]

use chrono::NaiveDate;
use forecast_trade::data::{PriceBar, PriceSeries};
use forecast_trade::models::ForestConfig;
use forecast_trade::utils::business_days_after;
use forecast_trade::providers::{MarketDataProvider, Period};
use forecast_trade::{ForecastError, PipelineConfig, Result};
use trade_math::RsiZeroLoss;

/// Business-day dates starting the first business day of 2020
pub fn dates(n: usize) -> Vec<NaiveDate> {
    business_days_after(NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(), n).unwrap()
}

/// Bars with the given closes, a 1% high/low band and varying volume
pub fn series_from_closes(symbol: &str, closes: &[f64]) -> PriceSeries {
    let bars = dates(closes.len())
        .into_iter()
        .zip(closes)
        .enumerate()
        .map(|(t, (date, &close))| PriceBar {
            date,
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000_000.0 + ((t * 7919) % 1000) as f64 * 1000.0,
        })
        .collect();
    PriceSeries::new(symbol, bars).unwrap()
}

/// `close = 100 + t`
pub fn linear_series(n: usize) -> PriceSeries {
    let closes: Vec<f64> = (0..n).map(|t| 100.0 + t as f64).collect();
    series_from_closes("LIN", &closes)
}

/// A wave around a gentle uptrend, with losses in every 14-bar window
pub fn wavy_series(n: usize) -> PriceSeries {
    let closes: Vec<f64> = (0..n)
        .map(|t| {
            let t = t as f64;
            let wobble = if t % 2.0 == 0.0 { 1.5 } else { -1.5 };
            100.0 + 0.05 * t + 8.0 * (t / 6.0).sin() + wobble
        })
        .collect();
    series_from_closes("WAVE", &closes)
}

/// Copy of `series` with each bar's volume replaced by `volume(index, old)`
pub fn with_volumes(series: &PriceSeries, volume: impl Fn(usize, f64) -> f64) -> PriceSeries {
    let bars = series
        .bars()
        .iter()
        .enumerate()
        .map(|(t, bar)| PriceBar {
            volume: volume(t, bar.volume),
            ..*bar
        })
        .collect();
    PriceSeries::new(series.symbol(), bars).unwrap()
}

pub fn small_forest() -> ForestConfig {
    ForestConfig {
        n_trees: 40,
        max_depth: 8,
        ..ForestConfig::default()
    }
}

/// Default pipeline settings with a smaller forest
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        forest: small_forest(),
        ..PipelineConfig::default()
    }
}

pub fn saturating_config() -> PipelineConfig {
    PipelineConfig {
        rsi_zero_loss: RsiZeroLoss::Saturate,
        ..test_config()
    }
}

/// In-memory provider serving one series
pub struct StaticProvider {
    pub series: PriceSeries,
}

impl MarketDataProvider for StaticProvider {
    fn fetch(&self, symbol: &str, _period: Period) -> Result<PriceSeries> {
        if symbol != self.series.symbol() {
            return Err(ForecastError::NotFound(format!("No data found for {}", symbol)));
        }
        Ok(self.series.clone())
    }
}
