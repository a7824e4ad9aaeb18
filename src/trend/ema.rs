//! Exponential moving average with span-based smoothing factor `α = 2 / (span + 1)`.

/// Smooth `series` with an EMA seeded from its first value.
pub fn exponential_moving_average(series: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    let mut prev: Option<f64> = None;
    for &v in series {
        let next = match prev {
            Some(p) => alpha * v + (1.0 - alpha) * p,
            None => v,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_series_is_unchanged() {
        let out = exponential_moving_average(&[64.2; 40], 28);
        assert!(out.iter().all(|&v| (v - 64.2).abs() < 1e-12));
    }

    #[test]
    fn recursion_matches_definition() {
        let out = exponential_moving_average(&[0.0, 6.0, 6.0], 5);
        let alpha = 1.0 / 3.0;
        assert_eq!(out[0], 0.0);
        assert!((out[1] - alpha * 6.0).abs() < 1e-12);
        assert!((out[2] - (alpha * 6.0 + (1.0 - alpha) * out[1])).abs() < 1e-12);
    }

    #[test]
    fn span_one_is_identity() {
        let series = [1.0, 5.0, -2.0];
        assert_eq!(exponential_moving_average(&series, 1), series.to_vec());
    }

    #[test]
    fn empty_series() {
        assert!(exponential_moving_average(&[], 5).is_empty());
    }
}
