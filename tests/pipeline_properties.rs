use std::collections::HashSet;

use approx::assert_abs_diff_eq;
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use bodycomp_trend::domain::{RawObservation, TrendConfig};
use bodycomp_trend::trend::ema::exponential_moving_average;
use bodycomp_trend::trend::interpolate::fill_gaps;
use bodycomp_trend::trend::{analyze, build_daily_series};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, 1).unwrap()
}

fn day(offset: u64) -> NaiveDate {
    start().checked_add_days(Days::new(offset)).unwrap()
}

fn observations_strategy() -> impl Strategy<Value = Vec<RawObservation>> {
    prop::collection::vec((0u64..120, 40.0f64..150.0, 5.0f64..50.0), 1..40).prop_map(|rows| {
        rows.into_iter()
            .map(|(offset, total, frac)| RawObservation::new(day(offset), total, frac))
            .collect()
    })
}

fn config_strategy() -> impl Strategy<Value = TrendConfig> {
    (
        0.05f64..2.0,
        0.01f64..2.0,
        0usize..12,
        0.5f64..5.0,
        0.01f64..1.0,
        1usize..15,
        1usize..60,
    )
        .prop_map(
            |(sigma_obs, sigma_proc, hampel_window, hampel_threshold, max_daily_change, short, long)| TrendConfig {
                sigma_obs,
                sigma_proc,
                hampel_window,
                hampel_threshold,
                max_daily_change,
                ema_span_short: short,
                ema_span_long: long,
            },
        )
}

proptest! {
    #[test]
    fn output_covers_every_calendar_day(obs in observations_strategy(), config in config_strategy()) {
        let records = build_daily_series(&obs, &config);
        let first = obs.iter().map(|o| o.date).min().unwrap();
        let last = obs.iter().map(|o| o.date).max().unwrap();

        prop_assert_eq!(records.len() as i64, (last - first).num_days() + 1);
        prop_assert_eq!(records[0].date, first);
        prop_assert!(records.windows(2).all(|w| (w[1].date - w[0].date).num_days() == 1));
    }

    #[test]
    fn every_day_is_dense_and_observed_only_when_measured(
        obs in observations_strategy(),
        config in config_strategy(),
    ) {
        let records = build_daily_series(&obs, &config);
        let measured: HashSet<NaiveDate> = obs.iter().map(|o| o.date).collect();

        for r in &records {
            for v in [
                r.interpolated_fat_mass,
                r.interpolated_total_mass,
                r.interpolated_lean_mass,
                r.interpolated_fat_fraction,
                r.fat_trend_short,
                r.fat_trend_long,
                r.lean_trend_short,
                r.lean_trend_long,
            ] {
                prop_assert!(v.is_finite());
            }
            let has = measured.contains(&r.date);
            prop_assert_eq!(r.observed_fat_mass.is_some(), has);
            prop_assert_eq!(r.observed_total_mass.is_some(), has);
            prop_assert_eq!(r.observed_lean_mass.is_some(), has);
        }
    }

    #[test]
    fn filtered_trend_never_exceeds_max_daily_change(
        obs in observations_strategy(),
        config in config_strategy(),
    ) {
        let analysis = analyze(&obs, &config).unwrap();
        for trend in [&analysis.fat.filtered.trend, &analysis.lean.filtered.trend] {
            for w in trend.windows(2) {
                prop_assert!((w[1] - w[0]).abs() <= config.max_daily_change + 1e-9);
            }
        }
    }

    #[test]
    fn gap_filling_reproduces_end_knots(
        values in prop::collection::vec(prop::option::of(10.0f64..120.0), 2..60),
    ) {
        let dense = fill_gaps(&values);
        let known: Vec<(usize, f64)> = values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
            .collect();
        prop_assert_eq!(dense.len(), values.len());
        if let (Some(&(i0, v0)), Some(&(i1, v1))) = (known.first(), known.last()) {
            prop_assert_eq!(dense[i0], v0);
            prop_assert_eq!(dense[i1], v1);
        }
    }
}

#[test]
fn ema_of_constant_series_is_constant() {
    let series = vec![63.25; 50];
    for span in [1, 5, 28, 100] {
        for v in exponential_moving_average(&series, span) {
            assert_abs_diff_eq!(v, 63.25, epsilon = 1e-12);
        }
    }
}

#[test]
fn single_spike_moves_short_trend_less_than_linear_interpolation() {
    let config = TrendConfig::default();
    let smooth: Vec<RawObservation> = (0..20)
        .map(|i| RawObservation::new(day(i), 80.0 - 0.02 * i as f64, 25.0 - 0.01 * i as f64))
        .collect();

    let spike_at = 12usize;
    let mut spiked = smooth.clone();
    spiked[spike_at] = RawObservation::new(day(spike_at as u64), smooth[spike_at].total_mass, 40.0);

    // Every day is a knot, so linear interpolation passes the spike through unchanged.
    let linear_change = (spiked[spike_at].fat_mass - smooth[spike_at].fat_mass).abs();

    let base = build_daily_series(&smooth, &config);
    let with_spike = build_daily_series(&spiked, &config);
    let trend_change = (with_spike[spike_at].fat_trend_short - base[spike_at].fat_trend_short).abs();

    assert!(linear_change > 10.0);
    assert!(
        trend_change < linear_change,
        "trend moved {trend_change}, linear interpolation {linear_change}"
    );
    assert!(trend_change <= config.max_daily_change + 1e-3);

    // The spike is flagged, so its day is predict-only and the estimate holds.
    let analysis = analyze(&spiked, &config).unwrap();
    assert!(analysis.fat.outliers[spike_at]);
    assert_eq!(analysis.fat.outlier_days(), 1);
    let trend = &analysis.fat.filtered.trend;
    assert_abs_diff_eq!(trend[spike_at], trend[spike_at - 1], epsilon = 1e-12);

    // Without the outlier stage the spike day is an update and the estimate moves.
    let unguarded = TrendConfig {
        hampel_threshold: 1e9,
        ..config
    };
    let analysis = analyze(&spiked, &unguarded).unwrap();
    assert!(!analysis.fat.outliers[spike_at]);
    let trend = &analysis.fat.filtered.trend;
    assert!(trend[spike_at] - trend[spike_at - 1] > 0.1);
}
