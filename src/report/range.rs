//! Visible date window selection.
//!
//! Quick ranges end at the last day of the series (or at `--to`) and are clamped
//! to the first day; explicit `--from` / `--to` bounds win over the preset.

use chrono::{Days, NaiveDate};

use crate::domain::{OutputRecord, RangeSelection};
use crate::error::AppError;

/// Resolve a selection against a series into inclusive `(start, end)` dates.
///
/// Returns `Ok(None)` for an empty series.
pub fn resolve_range(
    records: &[OutputRecord],
    selection: &RangeSelection,
) -> Result<Option<(NaiveDate, NaiveDate)>, AppError> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Ok(None);
    };

    let end = selection.to.unwrap_or(last.date).min(last.date);
    let start = match selection.from {
        Some(from) => from,
        None => match selection.quick.days() {
            Some(days) => end
                .checked_sub_days(Days::new(days.saturating_sub(1) as u64))
                .unwrap_or(first.date),
            None => first.date,
        },
    }
    .max(first.date);

    if start > end {
        return Err(AppError::invalid_input(format!(
            "Empty date range: {start} is after {end} (series covers {} to {}).",
            first.date, last.date
        )));
    }
    Ok(Some((start, end)))
}

/// Records whose date lies in `[start, end]`. `records` must be sorted by date.
pub fn select_range(records: &[OutputRecord], start: NaiveDate, end: NaiveDate) -> &[OutputRecord] {
    let lo = records.partition_point(|r| r.date < start);
    let hi = records.partition_point(|r| r.date <= end);
    if lo >= hi { &[] } else { &records[lo..hi] }
}

/// Resolve and apply a selection in one step.
pub fn apply_selection<'a>(
    records: &'a [OutputRecord],
    selection: &RangeSelection,
) -> Result<&'a [OutputRecord], AppError> {
    Ok(match resolve_range(records, selection)? {
        Some((start, end)) => select_range(records, start, end),
        None => &[],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuickRange, RawObservation, TrendConfig};
    use crate::trend::build_daily_series;

    fn records(days: u64) -> Vec<OutputRecord> {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d1 = d0.checked_add_days(Days::new(days - 1)).unwrap();
        build_daily_series(
            &[RawObservation::new(d0, 80.0, 20.0), RawObservation::new(d1, 78.0, 19.0)],
            &TrendConfig::default(),
        )
    }

    fn sel(quick: QuickRange) -> RangeSelection {
        RangeSelection {
            quick,
            ..RangeSelection::default()
        }
    }

    #[test]
    fn month_is_last_thirty_days() {
        let recs = records(100);
        let visible = apply_selection(&recs, &sel(QuickRange::Month)).unwrap();
        assert_eq!(visible.len(), 30);
        assert_eq!(visible.last().unwrap().date, recs.last().unwrap().date);
    }

    #[test]
    fn quick_range_clamps_to_first_day() {
        let recs = records(40);
        let visible = apply_selection(&recs, &sel(QuickRange::Year)).unwrap();
        assert_eq!(visible.len(), 40);
    }

    #[test]
    fn explicit_bounds_override_preset() {
        let recs = records(60);
        let selection = RangeSelection {
            quick: QuickRange::Month,
            from: NaiveDate::from_ymd_opt(2024, 1, 10),
            to: NaiveDate::from_ymd_opt(2024, 1, 19),
        };
        let visible = apply_selection(&recs, &selection).unwrap();
        assert_eq!(visible.len(), 10);
        assert_eq!(visible[0].date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn inverted_bounds_are_an_error() {
        let recs = records(10);
        let selection = RangeSelection {
            quick: QuickRange::All,
            from: NaiveDate::from_ymd_opt(2024, 1, 8),
            to: NaiveDate::from_ymd_opt(2024, 1, 3),
        };
        assert!(apply_selection(&recs, &selection).is_err());
    }
}
