//! Monotone piecewise-cubic Hermite interpolation (PCHIP).
//!
//! Knot derivatives follow the Fritsch–Carlson recipe:
//!
//! - interior knot `i`: `0` when the neighbouring secants `δ[i-1]`, `δ[i]` differ in
//!   sign (or either is zero), otherwise the weighted harmonic mean
//!   `(w1 + w2) / (w1/δ[i-1] + w2/δ[i])` with `w1 = 2h[i] + h[i-1]` and
//!   `w2 = h[i] + 2h[i-1]`
//! - end knots: the adjacent secant
//!
//! Outside `[x_first, x_last]` the interpolant is clamped to the end values.
//!
//! Two evaluation paths are provided:
//! - [`MonotoneSpline::evaluate`] for arbitrary queries (binary search)
//! - [`SplineCursor`] for non-decreasing queries, which walks the segments forward
//!   once so that evaluating a whole day grid stays `O(N + K)`

/// A monotone cubic Hermite spline over strictly increasing knots.
#[derive(Debug, Clone)]
pub struct MonotoneSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    slopes: Vec<f64>,
}

impl MonotoneSpline {
    /// Build a spline through `(xs[i], ys[i])`.
    ///
    /// Returns `None` when there are fewer than two knots, the lengths differ, or
    /// `xs` is not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Option<Self> {
        let n = xs.len();
        if n < 2 || ys.len() != n {
            return None;
        }
        if xs.windows(2).any(|w| !(w[1] > w[0])) {
            return None;
        }

        let mut h = Vec::with_capacity(n - 1);
        let mut delta = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let hi = xs[i + 1] - xs[i];
            h.push(hi);
            delta.push((ys[i + 1] - ys[i]) / hi);
        }

        let mut slopes = vec![0.0; n];
        for i in 1..n - 1 {
            // Opposite signs or a flat secant make a local extremum: keep it flat.
            if delta[i - 1] * delta[i] > 0.0 {
                let w1 = 2.0 * h[i] + h[i - 1];
                let w2 = h[i] + 2.0 * h[i - 1];
                slopes[i] = (w1 + w2) / (w1 / delta[i - 1] + w2 / delta[i]);
            }
        }
        slopes[0] = delta[0];
        slopes[n - 1] = delta[n - 2];

        Some(Self { xs, ys, slopes })
    }

    /// Evaluate at an arbitrary `t`.
    #[cfg(test)]
    pub fn evaluate(&self, t: f64) -> f64 {
        if let Some(v) = self.clamped(t) {
            return v;
        }
        // First knot strictly greater than or equal to t, minus one, is the segment start.
        let upper = self.xs.partition_point(|&x| x < t);
        self.segment_value(upper.saturating_sub(1), t)
    }

    /// A forward-only evaluator for non-decreasing query positions.
    pub fn cursor(&self) -> SplineCursor<'_> {
        SplineCursor {
            spline: self,
            segment: 0,
        }
    }

    fn clamped(&self, t: f64) -> Option<f64> {
        let last = self.xs.len() - 1;
        if t <= self.xs[0] {
            Some(self.ys[0])
        } else if t >= self.xs[last] {
            Some(self.ys[last])
        } else {
            None
        }
    }

    fn segment_value(&self, k: usize, t: f64) -> f64 {
        let width = self.xs[k + 1] - self.xs[k];
        let s = (t - self.xs[k]) / width;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * self.ys[k]
            + h10 * width * self.slopes[k]
            + h01 * self.ys[k + 1]
            + h11 * width * self.slopes[k + 1]
    }
}

/// Two-pointer evaluator: the active segment only ever moves forward.
#[derive(Debug)]
pub struct SplineCursor<'a> {
    spline: &'a MonotoneSpline,
    segment: usize,
}

impl SplineCursor<'_> {
    /// Evaluate at `t`; `t` must not decrease between calls.
    pub fn value_at(&mut self, t: f64) -> f64 {
        if let Some(v) = self.spline.clamped(t) {
            return v;
        }
        let xs = &self.spline.xs;
        while xs[self.segment + 1] < t {
            self.segment += 1;
        }
        self.spline.segment_value(self.segment, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spline(xs: &[f64], ys: &[f64]) -> MonotoneSpline {
        MonotoneSpline::new(xs.to_vec(), ys.to_vec()).unwrap()
    }

    #[test]
    fn rejects_degenerate_knots() {
        assert!(MonotoneSpline::new(vec![0.0], vec![1.0]).is_none());
        assert!(MonotoneSpline::new(vec![0.0, 0.0], vec![1.0, 2.0]).is_none());
        assert!(MonotoneSpline::new(vec![0.0, 1.0], vec![1.0]).is_none());
    }

    #[test]
    fn passes_through_knots_and_clamps_outside() {
        let s = spline(&[2.0, 5.0, 9.0], &[1.0, 4.0, 3.0]);
        assert_eq!(s.evaluate(2.0), 1.0);
        assert!((s.evaluate(5.0) - 4.0).abs() < 1e-12);
        assert_eq!(s.evaluate(9.0), 3.0);
        assert_eq!(s.evaluate(-10.0), 1.0);
        assert_eq!(s.evaluate(100.0), 3.0);
    }

    #[test]
    fn two_knots_is_linear() {
        let s = spline(&[0.0, 4.0], &[10.0, 12.0]);
        for i in 0..=4 {
            let t = i as f64;
            assert!((s.evaluate(t) - (10.0 + 0.5 * t)).abs() < 1e-12);
        }
    }

    #[test]
    fn no_overshoot_between_monotone_knots() {
        let xs = [0.0, 1.0, 2.0, 10.0, 11.0];
        let ys = [0.0, 0.1, 5.0, 5.1, 9.0];
        let s = spline(&xs, &ys);
        let mut prev = f64::NEG_INFINITY;
        for i in 0..=110 {
            let v = s.evaluate(i as f64 / 10.0);
            assert!(v >= prev - 1e-12, "not monotone at {i}: {v} < {prev}");
            assert!((0.0..=9.0).contains(&v));
            prev = v;
        }
    }

    #[test]
    fn local_extremum_stays_flat() {
        // Peak at the middle knot: the interpolant must not exceed it.
        let s = spline(&[0.0, 3.0, 6.0], &[1.0, 2.0, 1.0]);
        for i in 0..=60 {
            assert!(s.evaluate(i as f64 / 10.0) <= 2.0 + 1e-12);
        }
    }

    #[test]
    fn cursor_matches_random_access() {
        let s = spline(&[1.0, 4.0, 5.0, 12.0], &[70.0, 71.5, 70.8, 69.0]);
        let mut cursor = s.cursor();
        for i in 0..15 {
            let t = i as f64;
            assert!((cursor.value_at(t) - s.evaluate(t)).abs() < 1e-12, "t={t}");
        }
    }
}
