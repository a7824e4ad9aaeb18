//! Gap filling for sparse day channels.
//!
//! Known days become spline knots (x = day index); every day of the grid is then
//! evaluated in ascending order with a forward-only cursor.

use crate::domain::{Channel, SparseChannel};
use crate::math::MonotoneSpline;

/// Fill every gap of `sparse` with a monotone cubic interpolant.
///
/// - no known value: all zeros
/// - one known value: that value everywhere
/// - otherwise: PCHIP through the known days, clamped to the end values outside them
pub fn fill_gaps(sparse: &SparseChannel) -> Channel {
    let n = sparse.len();
    let (xs, ys): (Vec<f64>, Vec<f64>) = sparse
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| !v.is_nan()).map(|v| (i as f64, v)))
        .unzip();

    let Some(spline) = MonotoneSpline::new(xs, ys.clone()) else {
        let flat = ys.first().copied().unwrap_or(0.0);
        return vec![flat; n];
    };

    let mut cursor = spline.cursor();
    (0..n).map(|i| cursor.value_at(i as f64)).collect()
}
