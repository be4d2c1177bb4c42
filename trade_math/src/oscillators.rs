//! Oscillator indicator implementations
//!
//! Contains the Relative Strength Index (RSI), computed from simple trailing
//! means of gains and losses.

use crate::{check_window, Result};
use serde::{Deserialize, Serialize};

/// What RSI reports when the window contains no losses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiZeroLoss {
    /// RSI is undefined whenever the mean loss is zero.
    #[default]
    Exclude,
    /// RSI is 100 when the mean loss is zero and the mean gain is positive.
    /// A window with neither gains nor losses is still undefined.
    Saturate,
}

/// Relative Strength Index with [`RsiZeroLoss::Exclude`].
///
/// For each index `t >= window`, the mean gain and mean loss are taken over the
/// `window` price changes ending at `t`, and
/// `rsi = 100 - 100 / (1 + gain / loss)`.
pub fn rsi(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    rsi_with_policy(closes, window, RsiZeroLoss::Exclude)
}

/// Relative Strength Index with an explicit zero-loss policy.
pub fn rsi_with_policy(
    closes: &[f64],
    window: usize,
    zero_loss: RsiZeroLoss,
) -> Result<Vec<Option<f64>>> {
    check_window(window, 1)?;

    let mut result = vec![None; closes.len()];
    if closes.len() <= window {
        return Ok(result);
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    for t in window..closes.len() {
        // deltas[j - 1] is the change into bar j
        let changes = &deltas[t - window..t];
        let gain = changes.iter().map(|d| d.max(0.0)).sum::<f64>() / window as f64;
        let loss = changes.iter().map(|d| (-d).max(0.0)).sum::<f64>() / window as f64;

        result[t] = if loss == 0.0 {
            match zero_loss {
                RsiZeroLoss::Saturate if gain > 0.0 => Some(100.0),
                _ => None,
            }
        } else {
            let rs = gain / loss;
            Some(100.0 - 100.0 / (1.0 + rs))
        };
    }

    Ok(result)
}
