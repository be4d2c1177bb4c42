//! Market data providers
//!
//! [`MarketDataProvider`] is the single seam between the forecasting core and
//! wherever daily bars come from. Implementations must return bars oldest
//! first and report a symbol without data as [`ForecastError::NotFound`].
//!
//! The trait is object safe, so a provider can be chosen at runtime:
//!
//! ```
//! use forecast_trade::providers::{CsvProvider, MarketDataProvider};
//!
//! let provider: Box<dyn MarketDataProvider> = Box::new(CsvProvider::new("data"));
//! ```

pub mod csv_file;
pub mod yahoo;

pub use csv_file::CsvProvider;
pub use yahoo::YahooProvider;

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookback window requested from a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Period {
    /// Short code as used in provider query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// First date covered when the window ends on `end`; `None` for [`Period::Max`]
    pub fn start_for(&self, end: NaiveDate) -> Option<NaiveDate> {
        let months = match self {
            Period::OneMonth => 1,
            Period::ThreeMonths => 3,
            Period::SixMonths => 6,
            Period::OneYear => 12,
            Period::TwoYears => 24,
            Period::FiveYears => 60,
            Period::TenYears => 120,
            Period::YearToDate => return NaiveDate::from_ymd_opt(end.year(), 1, 1),
            Period::Max => return None,
        };
        end.checked_sub_months(Months::new(months))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            "10y" => Ok(Period::TenYears),
            "ytd" => Ok(Period::YearToDate),
            "max" => Ok(Period::Max),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unsupported period: {}",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.as_str().to_string()
    }
}

/// Source of daily bars for a symbol
pub trait MarketDataProvider {
    /// Fetch the bars of `symbol` covering `period`, oldest first.
    ///
    /// Fails with [`ForecastError::NotFound`] when there are no bars.
    fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries>;
}

impl<T: MarketDataProvider + ?Sized> MarketDataProvider for Box<T> {
    fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        (**self).fetch(symbol, period)
    }
}

impl<T: MarketDataProvider + ?Sized> MarketDataProvider for &T {
    fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        (**self).fetch(symbol, period)
    }
}
