//! Interquartile-range outlier clipping.

use crate::frame::Frame;

/// Multiplier applied to the IQR when computing the clipping fences.
const IQR_FENCE_FACTOR: f64 = 1.5;

/// Clips each listed numeric column into `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
///
/// Quartiles are computed over non-missing values with linear interpolation.
/// Missing values stay missing; non-numeric and absent columns are skipped.
/// The transform is pointwise and per-column, so re-applying it to already
/// clipped data is a no-op.
pub fn clip_outliers_iqr(frame: &mut Frame, columns: &[&str]) {
    for &name in columns {
        let Some(values) = frame.numeric_mut(name) else {
            continue;
        };

        // Non-finite cells carry no order information: they are excluded
        // from the quartiles and left untouched by the clamp.
        let mut present: Vec<f64> = values
            .iter()
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
            .collect();
        if present.is_empty() {
            continue;
        }
        present.sort_by(f64::total_cmp);

        let q1 = quantile(&present, 0.25);
        let q3 = quantile(&present, 0.75);
        let iqr = q3 - q1;
        let lower = q1 - IQR_FENCE_FACTOR * iqr;
        let upper = q3 + IQR_FENCE_FACTOR * iqr;

        for value in values.iter_mut() {
            if let Some(x) = value {
                if x.is_finite() {
                    *x = x.clamp(lower, upper);
                }
            }
        }
    }
}

/// Quantile of an ascending-sorted non-empty slice, with linear interpolation
/// between adjacent order statistics.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q;
    let low = position.floor() as usize;
    let high = position.ceil() as usize;
    let fraction = position - low as f64;

    sorted[low] + (sorted[high] - sorted[low]) * fraction
}
