//! Centered running mean.
//!
//! Position `i` holds the mean of the `window` values centered on it. The
//! first and last `window / 2` positions have no full window and are left
//! undefined, and any missing value inside a window makes that output
//! missing. There is no short-window fallback at the edges or across gaps.

use crate::model::SoiError;

/// Smoothing width used for the published overlay.
pub const DEFAULT_WINDOW: usize = 3;

pub fn running_mean(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>, SoiError> {
    if window == 0 || window % 2 == 0 {
        return Err(SoiError::Configuration(format!(
            "smoothing window must be a positive odd number, got {}",
            window
        )));
    }

    let half = window / 2;
    let mut out = vec![None; values.len()];
    if values.len() < window {
        return Ok(out);
    }

    for (i, slot) in out.iter_mut().enumerate().skip(half).take(values.len() - 2 * half) {
        let span = &values[i - half..=i + half];
        *slot = span
            .iter()
            .copied()
            .sum::<Option<f64>>()
            .map(|total| total / window as f64);
    }

    Ok(out)
}
