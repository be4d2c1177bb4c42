//! Volatility indicator implementations
//!
//! Contains rolling dispersion measures over closing prices:
//! - Rolling sample standard deviation
//! - Bollinger band width
//! - Annualized volatility of daily returns
//! - Percent change over a fixed lag

use crate::{check_window, Result};
use statrs::statistics::Statistics;

/// Trading days per year used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Trailing sample standard deviation (n - 1 denominator) over `window` values.
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    check_window(window, 2)?;

    let mut result = vec![None; values.len()];
    for t in window.saturating_sub(1)..values.len() {
        result[t] = Some(values[t + 1 - window..=t].iter().std_dev());
    }

    Ok(result)
}

/// Bollinger band width relative to the middle band.
///
/// With `ma` the trailing mean and `std` the trailing sample standard deviation,
/// the bands are `ma ± 2·std`, so the width `(upper - lower) / ma` equals
/// `4·std / ma`. Undefined when `ma` is zero.
pub fn bollinger_width(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    check_window(window, 2)?;

    let mut result = vec![None; closes.len()];
    for t in window.saturating_sub(1)..closes.len() {
        let slice = &closes[t + 1 - window..=t];
        let ma = slice.iter().sum::<f64>() / window as f64;
        if ma == 0.0 {
            continue;
        }
        let std = slice.iter().std_dev();
        let upper = ma + 2.0 * std;
        let lower = ma - 2.0 * std;
        result[t] = Some((upper - lower) / ma);
    }

    Ok(result)
}

/// Fractional change against the value `periods` entries earlier:
/// `(x[t] - x[t - periods]) / x[t - periods]`.
///
/// Undefined for the first `periods` entries and where the earlier value is zero.
pub fn pct_change(values: &[f64], periods: usize) -> Result<Vec<Option<f64>>> {
    check_window(periods, 1)?;

    let mut result = vec![None; values.len()];
    for t in periods..values.len() {
        let prior = values[t - periods];
        if prior != 0.0 {
            result[t] = Some((values[t] - prior) / prior);
        }
    }

    Ok(result)
}

/// Annualized volatility: sample standard deviation of the `window` daily
/// returns ending at `t`, scaled by √252.
///
/// Needs `window + 1` closes, so the first `window` entries are `None`.
pub fn annualized_volatility(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    check_window(window, 2)?;

    let returns = pct_change(closes, 1)?;
    let mut result = vec![None; closes.len()];

    for t in window..closes.len() {
        let slice = &returns[t + 1 - window..=t];
        if slice.iter().any(Option::is_none) {
            continue;
        }
        let std = slice.iter().flatten().std_dev();
        result[t] = Some(std * TRADING_DAYS_PER_YEAR.sqrt());
    }

    Ok(result)
}
