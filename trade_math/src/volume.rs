//! Volume indicator implementations
//!
//! Contains volume-based ratios:
//! - Day-over-day volume change
//! - Volume relative to its trailing mean

use crate::moving_averages::sma;
use crate::volatility::pct_change;
use crate::Result;

/// Fractional change of volume against the prior bar.
///
/// Undefined for the first bar and after a zero-volume bar.
pub fn volume_change(volumes: &[f64]) -> Result<Vec<Option<f64>>> {
    pct_change(volumes, 1)
}

/// Current volume divided by the trailing `window`-bar mean volume.
///
/// Undefined until the window fills and where the mean volume is zero.
pub fn volume_ma_ratio(volumes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let means = sma(volumes, window)?;

    Ok(volumes
        .iter()
        .zip(means)
        .map(|(&volume, mean)| match mean {
            Some(m) if m != 0.0 => Some(volume / m),
            _ => None,
        })
        .collect())
}
