//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the trend pipeline
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Decimal places kept for interpolated total and lean mass in output records.
pub const MASS_DECIMALS: u32 = 2;
/// Decimal places kept for the interpolated fat mass.
pub const FAT_MASS_DECIMALS: u32 = 3;
/// Decimal places kept for trend curves and daily trend changes.
pub const TREND_DECIMALS: u32 = 3;
/// Decimal places kept for the interpolated fat fraction (percent).
pub const PERCENT_DECIMALS: u32 = 1;

/// A per-day channel with explicit gaps (`None` = no measurement that day).
pub type SparseChannel = Vec<Option<f64>>;

/// A gap-free per-day channel aligned to the day grid.
pub type Channel = Vec<f64>;

/// A normalized body-composition measurement.
///
/// `fat_mass` is always derived as `total_mass * fat_fraction / 100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: NaiveDate,
    /// Total body mass (kg).
    pub total_mass: f64,
    /// Body fat percentage in `(0, 100]`.
    pub fat_fraction: f64,
    /// Fat mass (kg).
    pub fat_mass: f64,
}

impl RawObservation {
    pub fn new(date: NaiveDate, total_mass: f64, fat_fraction: f64) -> Self {
        Self {
            date,
            total_mass,
            fat_fraction,
            fat_mass: total_mass * fat_fraction / 100.0,
        }
    }

    /// Lean (fat-free) mass measured on this day.
    pub fn lean_mass(&self) -> f64 {
        self.total_mass - self.fat_mass
    }
}

/// Which measured quantity a sparse channel carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    FatMass,
    TotalMass,
    FatFraction,
    LeanMass,
}

impl ChannelKind {
    /// Extract this channel's value from a measurement.
    pub fn value_of(self, obs: &RawObservation) -> f64 {
        match self {
            ChannelKind::FatMass => obs.fat_mass,
            ChannelKind::TotalMass => obs.total_mass,
            ChannelKind::FatFraction => obs.fat_fraction,
            ChannelKind::LeanMass => obs.lean_mass(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChannelKind::FatMass => "fat mass",
            ChannelKind::TotalMass => "total mass",
            ChannelKind::FatFraction => "fat fraction",
            ChannelKind::LeanMass => "lean mass",
        }
    }
}

/// What the trend filter does with a given day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStep {
    /// Fold the day's value into the estimate.
    Update(f64),
    /// The day was flagged as an outlier: predict only, no measurement update.
    PredictOnly,
}

/// Tunable parameters of the trend pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Observation-noise standard deviation of the random-walk filter (kg).
    pub sigma_obs: f64,
    /// Process-noise standard deviation of the random-walk filter (kg/day).
    pub sigma_proc: f64,
    /// One-sided trailing window of the Hampel outlier detector (days).
    pub hampel_window: usize,
    /// Hampel threshold, in multiples of the window MAD.
    pub hampel_threshold: f64,
    /// Largest allowed day-over-day trend movement (kg).
    pub max_daily_change: f64,
    /// EMA span for the short-term trend.
    pub ema_span_short: usize,
    /// EMA span for the long-term trend.
    pub ema_span_long: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            sigma_obs: 0.3,
            sigma_proc: 0.25,
            hampel_window: 6,
            hampel_threshold: 2.5,
            max_daily_change: 0.19,
            ema_span_short: 5,
            ema_span_long: 28,
        }
    }
}

impl TrendConfig {
    /// Reject parameter combinations the filters cannot work with.
    pub fn validate(&self) -> Result<(), AppError> {
        let positive = [
            ("sigma-obs", self.sigma_obs),
            ("sigma-proc", self.sigma_proc),
            ("hampel-threshold", self.hampel_threshold),
            ("max-daily-change", self.max_daily_change),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AppError::invalid_input(format!(
                    "Invalid --{name}: {value} (must be finite and > 0)."
                )));
            }
        }
        if self.ema_span_short == 0 || self.ema_span_long == 0 {
            return Err(AppError::invalid_input("EMA spans must be >= 1."));
        }
        Ok(())
    }
}

/// One densified day of the output series.
///
/// `observed_*` fields are present only on days backed by a measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub date: NaiveDate,
    /// Milliseconds since the Unix epoch at UTC midnight of `date`.
    pub timestamp: i64,
    pub observed_fat_mass: Option<f64>,
    pub interpolated_fat_mass: f64,
    pub observed_total_mass: Option<f64>,
    pub interpolated_total_mass: f64,
    pub observed_lean_mass: Option<f64>,
    pub interpolated_lean_mass: f64,
    pub fat_trend_short: f64,
    pub fat_trend_long: f64,
    pub lean_trend_short: f64,
    pub lean_trend_long: f64,
    pub interpolated_fat_fraction: f64,
}

/// Milliseconds since the Unix epoch at UTC midnight of `date`.
pub fn day_timestamp_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Chart content selector (terminal plot and TUI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartMode {
    /// Interpolated values, observations, and trend curves.
    Absolute,
    /// Day-over-day change of the short-term trends.
    DailyChange,
    /// Observed value minus short-term trend, on measured days.
    Difference,
}

impl ChartMode {
    pub fn display_name(self) -> &'static str {
        match self {
            ChartMode::Absolute => "absolute",
            ChartMode::DailyChange => "daily change",
            ChartMode::Difference => "observed - trend",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChartMode::Absolute => ChartMode::DailyChange,
            ChartMode::DailyChange => ChartMode::Difference,
            ChartMode::Difference => ChartMode::Absolute,
        }
    }
}

/// Absolute-mode series that stay hidden unless asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtraSeries {
    /// Interpolated total mass, in its own panel.
    pub weight: bool,
    /// Interpolated lean mass, under the lean trends.
    pub interpolated_lean: bool,
}

/// Preset date windows ending at the last day of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QuickRange {
    /// Last 30 days.
    Month,
    /// Last 90 days.
    Quarter,
    /// Last 365 days.
    Year,
    /// The full series.
    All,
}

impl QuickRange {
    /// Window length in days (`None` = unbounded).
    pub fn days(self) -> Option<i64> {
        match self {
            QuickRange::Month => Some(30),
            QuickRange::Quarter => Some(90),
            QuickRange::Year => Some(365),
            QuickRange::All => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            QuickRange::Month => "1 month",
            QuickRange::Quarter => "3 months",
            QuickRange::Year => "1 year",
            QuickRange::All => "all",
        }
    }
}

/// The visible date window requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSelection {
    pub quick: QuickRange,
    /// Explicit start; overrides the quick range start when set.
    pub from: Option<NaiveDate>,
    /// Explicit end; overrides the series end when set.
    pub to: Option<NaiveDate>,
}

impl Default for RangeSelection {
    fn default() -> Self {
        Self {
            quick: QuickRange::All,
            from: None,
            to: None,
        }
    }
}

/// Summary stats about the measurements actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_observations: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub total_mass_min: f64,
    pub total_mass_max: f64,
}

/// Inclusive date span of a saved series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// A saved series file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesFile {
    pub tool: String,
    pub generated_for: DateSpan,
    pub config: TrendConfig,
    pub records: Vec<OutputRecord>,
}

/// A full run's configuration as understood by the application layer.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub trend: TrendConfig,
    pub range: RangeSelection,
    pub mode: ChartMode,
    pub extras: ExtraSeries,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_series: Option<PathBuf>,
    pub debug_bundle: bool,
}
