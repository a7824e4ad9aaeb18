//! Calendar densification.
//!
//! Turns an unordered list of measurements into a gap-free day grid spanning
//! `[min(date), max(date)]` and exposes one sparse channel per measured quantity.
//!
//! Duplicate dates: after a stable ascending sort, the later entry for a day
//! overwrites earlier ones.

use chrono::{Days, NaiveDate};

use crate::domain::{ChannelKind, RawObservation, SparseChannel};

/// Measurements mapped onto a contiguous day grid.
#[derive(Debug, Clone)]
pub struct DayGrid {
    dates: Vec<NaiveDate>,
    by_day: Vec<Option<RawObservation>>,
}

impl DayGrid {
    /// Number of days in the grid (`days_between(first, last) + 1`).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// The measurement that backs day `index`, if any.
    pub fn observation(&self, index: usize) -> Option<&RawObservation> {
        self.by_day.get(index).and_then(Option::as_ref)
    }

    /// Number of days that carry a measurement.
    pub fn observed_days(&self) -> usize {
        self.by_day.iter().filter(|o| o.is_some()).count()
    }

    /// Per-day values of one quantity, `None` on days without a measurement.
    pub fn channel(&self, kind: ChannelKind) -> SparseChannel {
        self.by_day
            .iter()
            .map(|o| o.as_ref().map(|obs| kind.value_of(obs)))
            .collect()
    }
}

/// Build the day grid for a set of measurements.
///
/// Returns `None` for an empty input.
pub fn densify(observations: &[RawObservation]) -> Option<DayGrid> {
    let mut sorted = observations.to_vec();
    // `sort_by_key` is stable, which is what makes "last entry wins" well defined.
    sorted.sort_by_key(|o| o.date);

    let first = sorted.first()?.date;
    let last = sorted.last()?.date;
    let n_days = (last - first).num_days() as usize + 1;

    let dates: Vec<NaiveDate> = (0..n_days)
        .map_while(|i| first.checked_add_days(Days::new(i as u64)))
        .collect();

    let mut by_day = vec![None; dates.len()];
    for obs in sorted {
        let index = (obs.date - first).num_days() as usize;
        if let Some(slot) = by_day.get_mut(index) {
            *slot = Some(obs);
        }
    }

    Some(DayGrid { dates, by_day })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn grid_spans_inclusive_range_in_order() {
        let obs = vec![
            RawObservation::new(day(5), 80.0, 20.0),
            RawObservation::new(day(1), 81.0, 21.0),
        ];
        let grid = densify(&obs).unwrap();
        assert_eq!(grid.len(), 5);
        assert_eq!(grid.first_date(), day(1));
        assert_eq!(grid.last_date(), day(5));
        assert!(grid.dates().windows(2).all(|w| (w[1] - w[0]).num_days() == 1));
        assert_eq!(grid.observed_days(), 2);
    }

    #[test]
    fn channels_have_gaps_on_unobserved_days() {
        let obs = vec![
            RawObservation::new(day(1), 80.0, 25.0),
            RawObservation::new(day(3), 82.0, 25.0),
        ];
        let grid = densify(&obs).unwrap();
        assert_eq!(grid.channel(ChannelKind::FatMass), vec![Some(20.0), None, Some(20.5)]);
        assert_eq!(grid.channel(ChannelKind::LeanMass), vec![Some(60.0), None, Some(61.5)]);
        assert_eq!(grid.channel(ChannelKind::TotalMass)[1], None);
    }

    #[test]
    fn later_duplicate_wins() {
        let obs = vec![
            RawObservation::new(day(2), 70.0, 20.0),
            RawObservation::new(day(1), 80.0, 20.0),
            RawObservation::new(day(2), 90.0, 20.0),
        ];
        let grid = densify(&obs).unwrap();
        assert_eq!(grid.observation(1).unwrap().total_mass, 90.0);
        assert_eq!(grid.channel(ChannelKind::FatMass)[1], Some(18.0));
    }

    #[test]
    fn identical_dates_give_single_day() {
        let obs = vec![
            RawObservation::new(day(9), 70.0, 20.0),
            RawObservation::new(day(9), 71.0, 20.0),
        ];
        let grid = densify(&obs).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.observation(0).unwrap().total_mass, 71.0);
    }

    #[test]
    fn empty_input_has_no_grid() {
        assert!(densify(&[]).is_none());
    }
}
