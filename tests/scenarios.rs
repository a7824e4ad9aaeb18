use approx::assert_abs_diff_eq;
use chrono::NaiveDate;

use bodycomp_trend::app::pipeline::{ensure_sufficient, run_with_ingest};
use bodycomp_trend::domain::{RawObservation, TrendConfig};
use bodycomp_trend::io::ingest::read_observations;
use bodycomp_trend::trend::{analyze, build_daily_series};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

#[test]
fn flat_pair_with_gap_interpolates_flat_value() {
    let obs = [RawObservation::new(d(1), 100.0, 20.0), RawObservation::new(d(3), 100.0, 20.0)];
    let records = build_daily_series(&obs, &TrendConfig::default());

    assert_eq!(records.len(), 3);
    assert!(records[1].observed_fat_mass.is_none());
    for r in &records {
        assert_abs_diff_eq!(r.interpolated_fat_mass, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.interpolated_total_mass, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.interpolated_fat_fraction, 20.0, epsilon = 1e-9);
    }
}

#[test]
fn consecutive_pair_has_no_filler_days() {
    let obs = [RawObservation::new(d(1), 100.0, 20.0), RawObservation::new(d(2), 100.0, 20.0)];
    let records = build_daily_series(&obs, &TrendConfig::default());
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.observed_fat_mass.is_some()));
}

#[test]
fn later_duplicate_wins() {
    let obs = [
        RawObservation::new(d(1), 80.0, 25.0),
        RawObservation::new(d(2), 80.0, 25.0),
        RawObservation::new(d(2), 90.0, 30.0),
    ];
    let records = build_daily_series(&obs, &TrendConfig::default());

    assert_eq!(records.len(), 2);
    assert_abs_diff_eq!(records[1].observed_fat_mass.unwrap(), 27.0, epsilon = 1e-9);
    assert_abs_diff_eq!(records[1].observed_total_mass.unwrap(), 90.0, epsilon = 1e-9);
}

#[test]
fn duplicate_order_survives_unsorted_input() {
    // Same-day entries keep their input order through the sort.
    let obs = [
        RawObservation::new(d(5), 70.0, 20.0),
        RawObservation::new(d(1), 80.0, 25.0),
        RawObservation::new(d(5), 72.0, 21.0),
    ];
    let records = build_daily_series(&obs, &TrendConfig::default());
    assert_eq!(records.len(), 5);
    assert_abs_diff_eq!(records[4].observed_total_mass.unwrap(), 72.0, epsilon = 1e-9);
}

#[test]
fn identical_pair_is_constant_everywhere() {
    let obs = [RawObservation::new(d(1), 75.0, 22.0), RawObservation::new(d(10), 75.0, 22.0)];
    let config = TrendConfig::default();
    let analysis = analyze(&obs, &config).unwrap();

    let fat = 75.0 * 22.0 / 100.0;
    let lean = 75.0 - fat;
    for (channel, value) in [(&analysis.fat, fat), (&analysis.lean, lean)] {
        assert_eq!(channel.filtered.clamped_days, 0);
        assert_eq!(channel.outlier_days(), 0);
        for series in [&channel.dense, &channel.filtered.trend, &channel.short, &channel.long] {
            assert_eq!(series.len(), 10);
            for &v in series.iter() {
                assert_abs_diff_eq!(v, value, epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn empty_input_yields_empty_series() {
    assert!(build_daily_series(&[], &TrendConfig::default()).is_empty());
    assert!(analyze(&[], &TrendConfig::default()).is_none());
}

#[test]
fn single_observation_is_a_one_day_series_but_insufficient_for_a_run() {
    let obs = [RawObservation::new(d(4), 70.0, 18.0)];
    let records = build_daily_series(&obs, &TrendConfig::default());
    assert_eq!(records.len(), 1);
    assert_abs_diff_eq!(records[0].fat_trend_short, 12.6, epsilon = 1e-9);

    let ingest = read_observations("date,weight,fat\n2024-03-04,70,18\n".as_bytes()).unwrap();
    let err = ensure_sufficient(&ingest).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(run_with_ingest(ingest, &TrendConfig::default()).is_err());
}

#[test]
fn parallel_channels_match_serial_stages() {
    let obs: Vec<RawObservation> = (1..=28)
        .step_by(3)
        .map(|day| RawObservation::new(d(day), 80.0 + (day % 4) as f64 * 0.3, 24.0 + (day % 5) as f64 * 0.2))
        .collect();
    let config = TrendConfig::default();
    let analysis = analyze(&obs, &config).unwrap();

    let serial = bodycomp_trend::trend::smooth_channel(analysis.fat.dense.clone(), &config);
    assert_eq!(serial.filtered, analysis.fat.filtered);
    assert_eq!(serial.short, analysis.fat.short);
    assert_eq!(serial.long, analysis.fat.long);
}
