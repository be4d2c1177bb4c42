//! Column standardization

use crate::error::{ForecastError, Result};
use statrs::statistics::Statistics;

/// Per-column zero-mean, unit-variance scaling fitted on training rows.
///
/// Uses the population standard deviation. A column without variance is
/// centred but not scaled.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit column statistics on `rows`
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = match rows.first() {
            Some(row) => row.len(),
            None => {
                return Err(ForecastError::ModelFit(
                    "Cannot fit a scaler on zero rows".to_string(),
                ))
            }
        };
        if rows.iter().any(|r| r.len() != width) {
            return Err(ForecastError::ModelFit(
                "Scaler rows have inconsistent widths".to_string(),
            ));
        }

        let mut means = Vec::with_capacity(width);
        let mut scales = Vec::with_capacity(width);
        for j in 0..width {
            let mean = rows.iter().map(|r| r[j]).mean();
            let std = rows.iter().map(|r| r[j]).population_std_dev();
            means.push(mean);
            scales.push(if std > 0.0 && std.is_finite() { std } else { 1.0 });
        }

        Ok(Self { means, scales })
    }

    /// Column means
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Column scales
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Standardize a single row
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.means.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Row has {} values, scaler was fitted on {}",
                row.len(),
                self.means.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }

    /// Standardize many rows
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}
