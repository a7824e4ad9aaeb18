//! Daily trend pipeline.
//!
//! ```text
//! measurements -> day grid -> 4 sparse channels -> gap filling
//!   fat / lean:  Hampel mask -> constrained filter -> EMA(short), EMA(long)
//!   total / fat%: gap filling only
//! ```
//!
//! Everything runs at full precision; values are rounded exactly once, when the
//! output records are assembled.

use tracing::debug;

use crate::domain::{
    Channel, ChannelKind, FAT_MASS_DECIMALS, MASS_DECIMALS, OutputRecord, PERCENT_DECIMALS, RawObservation,
    TREND_DECIMALS, TrendConfig, day_timestamp_millis,
};
use crate::math::round_to;
use crate::trend::calendar::{DayGrid, densify};
use crate::trend::ema::exponential_moving_average;
use crate::trend::hampel::{detect_with_config, filter_steps};
use crate::trend::interpolate::fill_gaps;
use crate::trend::kalman::{FilteredTrend, run_filter};

/// All intermediate stages of one mass channel.
#[derive(Debug, Clone)]
pub struct ChannelTrend {
    /// Gap-filled daily values.
    pub dense: Channel,
    /// Hampel outlier mask over `dense`.
    pub outliers: Vec<bool>,
    /// Rate-limited random-walk filter output.
    pub filtered: FilteredTrend,
    pub short: Vec<f64>,
    pub long: Vec<f64>,
}

impl ChannelTrend {
    pub fn outlier_days(&self) -> usize {
        self.outliers.iter().filter(|&&o| o).count()
    }
}

/// Full-precision pipeline output for one input set.
#[derive(Debug, Clone)]
pub struct TrendAnalysis {
    pub grid: DayGrid,
    pub fat: ChannelTrend,
    pub lean: ChannelTrend,
    pub total_mass: Channel,
    pub fat_fraction: Channel,
}

/// Run outlier detection, the constrained filter, and both EMAs over a dense channel.
pub fn smooth_channel(dense: Channel, config: &TrendConfig) -> ChannelTrend {
    let outliers = detect_with_config(&dense, config);
    let steps = filter_steps(&dense, &outliers);
    let filtered = run_filter(&dense, &steps, config);
    let short = exponential_moving_average(&filtered.trend, config.ema_span_short);
    let long = exponential_moving_average(&filtered.trend, config.ema_span_long);
    ChannelTrend {
        dense,
        outliers,
        filtered,
        short,
        long,
    }
}

/// Run every stage and keep the intermediate channels.
///
/// Returns `None` for an empty input.
pub fn analyze(observations: &[RawObservation], config: &TrendConfig) -> Option<TrendAnalysis> {
    let grid = densify(observations)?;
    debug!(
        days = grid.len(),
        observed_days = grid.observed_days(),
        first = %grid.first_date(),
        last = %grid.last_date(),
        "built day grid"
    );

    let fat_dense = fill_gaps(&grid.channel(ChannelKind::FatMass));
    let lean_dense = fill_gaps(&grid.channel(ChannelKind::LeanMass));
    let total_mass = fill_gaps(&grid.channel(ChannelKind::TotalMass));
    let fat_fraction = fill_gaps(&grid.channel(ChannelKind::FatFraction));

    // Channels are independent from here on; each pass is still a single ordered scan.
    let (fat, lean) = rayon::join(
        || smooth_channel(fat_dense, config),
        || smooth_channel(lean_dense, config),
    );

    for (kind, channel) in [(ChannelKind::FatMass, &fat), (ChannelKind::LeanMass, &lean)] {
        debug!(
            channel = kind.label(),
            outliers = channel.outlier_days(),
            clamped = channel.filtered.clamped_days,
            "smoothed channel"
        );
    }

    Some(TrendAnalysis {
        grid,
        fat,
        lean,
        total_mass,
        fat_fraction,
    })
}

impl TrendAnalysis {
    /// Assemble presentation-rounded output records, one per day.
    pub fn records(&self) -> Vec<OutputRecord> {
        self.grid
            .dates()
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                let obs = self.grid.observation(i);
                OutputRecord {
                    date,
                    timestamp: day_timestamp_millis(date),
                    observed_fat_mass: obs.map(|o| o.fat_mass),
                    interpolated_fat_mass: round_to(self.fat.dense[i], FAT_MASS_DECIMALS),
                    observed_total_mass: obs.map(|o| o.total_mass),
                    interpolated_total_mass: round_to(self.total_mass[i], MASS_DECIMALS),
                    observed_lean_mass: obs.map(|o| round_to(o.lean_mass(), MASS_DECIMALS)),
                    interpolated_lean_mass: round_to(self.lean.dense[i], MASS_DECIMALS),
                    fat_trend_short: round_to(self.fat.short[i], TREND_DECIMALS),
                    fat_trend_long: round_to(self.fat.long[i], TREND_DECIMALS),
                    lean_trend_short: round_to(self.lean.short[i], TREND_DECIMALS),
                    lean_trend_long: round_to(self.lean.long[i], TREND_DECIMALS),
                    interpolated_fat_fraction: round_to(self.fat_fraction[i], PERCENT_DECIMALS),
                }
            })
            .collect()
    }
}

/// Turn sparse measurements into a dense daily series with trend estimates.
///
/// Callers are expected to reject inputs with fewer than two usable measurements;
/// an empty input yields an empty series.
pub fn build_daily_series(observations: &[RawObservation], config: &TrendConfig) -> Vec<OutputRecord> {
    analyze(observations, config)
        .map(|analysis| analysis.records())
        .unwrap_or_default()
}
