//! Constrained scalar random-walk filter.
//!
//! State model: `x_t = x_{t-1} + w`, `w ~ N(0, σ_proc²)`; measurement
//! `z_t = x_t + v`, `v ~ N(0, σ_obs²)`. After each update the day-over-day
//! movement of the estimate is clamped to `±max_daily_change`.
//!
//! There is deliberately no velocity term: on noisy daily body-composition data a
//! constant-value model with a hard rate limit does not overshoot.

use crate::domain::{FilterStep, TrendConfig};

/// Filter state carried from one day to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendState {
    pub estimate: f64,
    pub variance: f64,
}

/// Result of advancing the filter by one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub state: TrendState,
    /// Whether the rate limiter changed the estimate.
    pub clamped: bool,
}

impl TrendState {
    /// Initial state seeded from the first day's value.
    pub fn initial(value: f64, config: &TrendConfig) -> Self {
        Self {
            estimate: value,
            variance: config.sigma_obs * config.sigma_obs,
        }
    }

    /// Predict, optionally update, then rate-limit relative to the current estimate.
    pub fn advance(self, step: FilterStep, config: &TrendConfig) -> StepOutcome {
        let r = config.sigma_obs * config.sigma_obs;
        let x_pred = self.estimate;
        let p_pred = self.variance + config.sigma_proc * config.sigma_proc;

        let (mut x, p) = match step {
            FilterStep::Update(z) => {
                let gain = p_pred / (p_pred + r);
                (x_pred + gain * (z - x_pred), (1.0 - gain) * p_pred)
            }
            FilterStep::PredictOnly => (x_pred, p_pred),
        };

        let change = x - self.estimate;
        let clamped = change.abs() > config.max_daily_change;
        if clamped {
            x = self.estimate + change.signum() * config.max_daily_change;
        }

        StepOutcome {
            state: TrendState {
                estimate: x,
                variance: p,
            },
            clamped,
        }
    }
}

/// Trend series produced by one channel pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredTrend {
    pub trend: Vec<f64>,
    /// Number of days on which the rate limiter engaged.
    pub clamped_days: usize,
}

/// Run the filter over a full channel. `steps[0]` only seeds the state.
///
/// The first day seeds the estimate with its value even when flagged; a flagged
/// first day can never happen with a causal window anyway.
pub fn run_filter(values: &[f64], steps: &[FilterStep], config: &TrendConfig) -> FilteredTrend {
    let Some(&first) = values.first() else {
        return FilteredTrend {
            trend: Vec::new(),
            clamped_days: 0,
        };
    };
    debug_assert_eq!(values.len(), steps.len());

    let mut trend = Vec::with_capacity(values.len());
    let mut state = TrendState::initial(first, config);
    let mut clamped_days = 0usize;
    trend.push(state.estimate);

    for &step in steps.iter().skip(1) {
        let outcome = state.advance(step, config);
        if outcome.clamped {
            clamped_days += 1;
        }
        state = outcome.state;
        debug_assert!(state.estimate.is_finite(), "trend filter produced a non-finite estimate");
        trend.push(state.estimate);
    }

    FilteredTrend { trend, clamped_days }
}
