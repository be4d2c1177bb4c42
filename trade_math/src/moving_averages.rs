//! Moving average calculations

use crate::{check_window, Result};

/// Trailing simple moving average over `window` values, inclusive of the
/// current one.
///
/// The first `window - 1` entries are `None`.
///
/// # Examples
///
/// ```
/// use trade_math::sma;
///
/// let ma = sma(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
/// assert_eq!(ma, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
/// ```
pub fn sma(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    check_window(window, 1)?;

    let mut result = vec![None; values.len()];
    for t in window.saturating_sub(1)..values.len() {
        let sum: f64 = values[t + 1 - window..=t].iter().sum();
        result[t] = Some(sum / window as f64);
    }

    Ok(result)
}
