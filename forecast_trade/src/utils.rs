//! Utility functions for the forecast_trade crate

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, Weekday};

/// Round to two decimal places
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whether the date falls on Monday through Friday
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first weekday strictly after `date`. Holidays are not considered.
pub fn next_business_day(date: NaiveDate) -> Result<NaiveDate> {
    let mut current = date;
    loop {
        current = current.succ_opt().ok_or_else(|| {
            ForecastError::DataError(format!("No calendar date after {}", current))
        })?;
        if is_business_day(current) {
            return Ok(current);
        }
    }
}

/// The `count` consecutive business days following `date`
pub fn business_days_after(date: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    let mut days = Vec::with_capacity(count);
    let mut current = date;
    for _ in 0..count {
        current = next_business_day(current)?;
        days.push(current);
    }
    Ok(days)
}
