//! Daily price data handling for forecasting

use crate::error::{ForecastError, Result};
use crate::utils::round_to_cents;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One trading day of OHLCV data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date
    #[serde(alias = "Date")]
    pub date: NaiveDate,
    /// Open price
    #[serde(alias = "Open")]
    pub open: f64,
    /// High price
    #[serde(alias = "High")]
    pub high: f64,
    /// Low price
    #[serde(alias = "Low")]
    pub low: f64,
    /// Close price
    #[serde(alias = "Close")]
    pub close: f64,
    /// Traded volume
    #[serde(alias = "Volume")]
    pub volume: f64,
}

impl PriceBar {
    /// Check the per-bar invariants: positive finite prices, `low <= high`,
    /// non-negative finite volume.
    pub fn validate(&self) -> Result<()> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Err(ForecastError::DataError(format!(
                    "{} price on {} must be positive, got {}",
                    name, self.date, value
                )));
            }
        }

        if self.low > self.high {
            return Err(ForecastError::DataError(format!(
                "Low ({}) exceeds high ({}) on {}",
                self.low, self.high, self.date
            )));
        }

        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(ForecastError::DataError(format!(
                "Volume on {} must be non-negative, got {}",
                self.date, self.volume
            )));
        }

        Ok(())
    }
}

/// A date and closing price, as shown for recent history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Close price rounded to cents
    pub close: f64,
}

/// Chronologically ordered daily bars for one symbol
///
/// Dates are strictly increasing and every bar passes [`PriceBar::validate`].
/// An empty series is representable; providers report it as not found.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Create a series, checking every invariant
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self> {
        let symbol = symbol.into();

        for bar in &bars {
            bar.validate()?;
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::DataError(format!(
                "Bars for {} must have strictly increasing dates: {} followed by {}",
                symbol, pair[0].date, pair[1].date
            )));
        }

        Ok(Self { symbol, bars })
    }

    /// Ticker symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All bars, oldest first
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Number of bars
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series has no bars
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Trading dates
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Close prices
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// High prices
    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// Low prices
    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// Volumes
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// The last `n` bars (fewer if the series is shorter)
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }

    /// The last `n` closes rounded to cents, oldest first
    pub fn recent_closes(&self, n: usize) -> Vec<ClosePoint> {
        self.tail(n)
            .iter()
            .map(|b| ClosePoint {
                date: b.date,
                close: round_to_cents(b.close),
            })
            .collect()
    }

    /// The bars dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> PriceSeries {
        let first = self.bars.partition_point(|b| b.date < start);
        PriceSeries {
            symbol: self.symbol.clone(),
            bars: self.bars[first..].to_vec(),
        }
    }
}

/// Data loader for daily bar files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a series from a CSV file with a `date,open,high,low,close,volume` header
    pub fn from_csv<P: AsRef<Path>>(path: P, symbol: &str) -> Result<PriceSeries> {
        let file = File::open(path)?;
        Self::from_reader(file, symbol)
    }

    /// Load a series from any CSV reader. Rows may come in any order; they are
    /// sorted by date before validation.
    pub fn from_reader<R: Read>(reader: R, symbol: &str) -> Result<PriceSeries> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut bars = csv_reader
            .deserialize::<PriceBar>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        bars.sort_by_key(|b| b.date);

        PriceSeries::new(symbol, bars)
    }
}
