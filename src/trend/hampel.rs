//! Causal Hampel outlier detection.
//!
//! For day `i` the window is `values[max(0, i - W) ..= i]` (no look-ahead). A day
//! is flagged when `|x_i - median| > τ · MAD`. Windows with fewer than three
//! values, or with `MAD == 0`, never flag anything.

use crate::domain::{FilterStep, TrendConfig};
use crate::math::{median, median_abs_deviation};

/// Minimum number of window values needed before a day can be judged.
const MIN_WINDOW_VALUES: usize = 3;

/// Flag outlier days of a dense channel. The channel itself is not modified.
pub fn detect_outliers(values: &[f64], window: usize, threshold: f64) -> Vec<bool> {
    (0..values.len())
        .map(|i| is_outlier(values, i, window, threshold))
        .collect()
}

fn is_outlier(values: &[f64], index: usize, window: usize, threshold: f64) -> bool {
    let start = index.saturating_sub(window);
    let win = &values[start..=index];
    debug_assert!(win.iter().all(|v| v.is_finite()), "non-finite value in Hampel window");

    if win.len() < MIN_WINDOW_VALUES {
        return false;
    }
    let Some(med) = median(win) else {
        return false;
    };
    let Some(mad) = median_abs_deviation(win, med) else {
        return false;
    };
    if mad == 0.0 {
        return false;
    }
    (values[index] - med).abs() > threshold * mad
}

/// Turn a dense channel plus outlier mask into per-day filter instructions.
pub fn filter_steps(values: &[f64], outliers: &[bool]) -> Vec<FilterStep> {
    values
        .iter()
        .zip(outliers)
        .map(|(&v, &flagged)| {
            if flagged {
                FilterStep::PredictOnly
            } else {
                FilterStep::Update(v)
            }
        })
        .collect()
}

/// Detect outliers with the configured window and threshold.
pub fn detect_with_config(values: &[f64], config: &TrendConfig) -> Vec<bool> {
    detect_outliers(values, config.hampel_window, config.hampel_threshold)
}
