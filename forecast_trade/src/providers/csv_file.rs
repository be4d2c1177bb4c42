//! Offline provider reading one CSV file per symbol

use super::{MarketDataProvider, Period};
use crate::data::{DataLoader, PriceSeries};
use crate::error::{ForecastError, Result};
use log::debug;
use std::path::{Path, PathBuf};

/// Reads `{dir}/{SYMBOL}.csv` files with a `date,open,high,low,close,volume`
/// header and trims them to the requested period, counted back from the last
/// bar in the file.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    /// Provider over the files in `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path the provider reads for `symbol`
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

impl MarketDataProvider for CsvProvider {
    fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        if symbol.is_empty() || symbol.contains(['/', '\\']) || symbol.starts_with('.') {
            return Err(ForecastError::InvalidParameter(format!(
                "Invalid symbol: {:?}",
                symbol
            )));
        }

        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(ForecastError::NotFound(format!(
                "No data file for {} at {}",
                symbol,
                path.display()
            )));
        }

        let series = DataLoader::from_csv(&path, &symbol.to_uppercase())?;
        let series = match series.last().and_then(|b| period.start_for(b.date)) {
            Some(start) => series.since(start),
            None => series,
        };
        debug!("Loaded {} bars for {} from {}", series.len(), symbol, path.display());

        if series.is_empty() {
            return Err(ForecastError::NotFound(format!(
                "No data found for {} over {}",
                symbol, period
            )));
        }
        Ok(series)
    }
}
