//! Reporting utilities: derived views and formatted terminal output.
//!
//! We keep these in one place so:
//! - the trend pipeline stays free of presentation concerns
//! - the CLI, plot, and TUI share the exact same derived series

use chrono::NaiveDate;

use crate::domain::{OutputRecord, TREND_DECIMALS};
use crate::math::round_to;

pub mod format;
pub mod range;

pub use format::*;
pub use range::*;

/// Day-over-day change of the short-term trends.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyChange {
    pub date: NaiveDate,
    pub timestamp: i64,
    pub fat_change: f64,
    pub lean_change: f64,
}

/// Observed value minus short-term trend on measured days.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendResidual {
    pub date: NaiveDate,
    pub timestamp: i64,
    pub fat_difference: Option<f64>,
    pub lean_difference: Option<f64>,
}

/// Change of the short-term trends between consecutive days.
///
/// Entry `i` is dated by record `i + 1`; fewer than two records give nothing.
pub fn daily_changes(records: &[OutputRecord]) -> Vec<DailyChange> {
    records
        .windows(2)
        .map(|w| DailyChange {
            date: w[1].date,
            timestamp: w[1].timestamp,
            fat_change: round_to(w[1].fat_trend_short - w[0].fat_trend_short, TREND_DECIMALS),
            lean_change: round_to(w[1].lean_trend_short - w[0].lean_trend_short, TREND_DECIMALS),
        })
        .collect()
}

/// Observed-minus-trend residuals for every record.
pub fn trend_residuals(records: &[OutputRecord]) -> Vec<TrendResidual> {
    records
        .iter()
        .map(|r| TrendResidual {
            date: r.date,
            timestamp: r.timestamp,
            fat_difference: r.observed_fat_mass.map(|v| v - r.fat_trend_short),
            lean_difference: r.observed_lean_mass.map(|v| v - r.lean_trend_short),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RawObservation, TrendConfig};
    use crate::trend::build_daily_series;

    fn sample() -> Vec<OutputRecord> {
        let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        build_daily_series(
            &[
                RawObservation::new(d(1), 80.0, 25.0),
                RawObservation::new(d(4), 79.0, 24.0),
                RawObservation::new(d(6), 79.4, 24.5),
            ],
            &TrendConfig::default(),
        )
    }

    #[test]
    fn daily_changes_follow_short_trend() {
        let records = sample();
        let changes = daily_changes(&records);
        assert_eq!(changes.len(), records.len() - 1);
        assert_eq!(changes[0].date, records[1].date);
        let want = round_to(records[1].fat_trend_short - records[0].fat_trend_short, 3);
        assert_eq!(changes[0].fat_change, want);
        assert!(daily_changes(&records[..1]).is_empty());
    }

    #[test]
    fn residuals_only_on_measured_days() {
        let records = sample();
        let residuals = trend_residuals(&records);
        assert_eq!(residuals.len(), records.len());
        assert!(residuals[0].fat_difference.is_some());
        assert!(residuals[1].fat_difference.is_none());
        assert!(residuals[1].lean_difference.is_none());
        // The first day seeds every stage, so the residual is zero there.
        assert_eq!(residuals[0].fat_difference, Some(0.0));
    }
}
