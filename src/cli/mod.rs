//! Command-line parsing for the body-composition trend tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the trend pipeline. Every trend parameter can also come from a
//! `BCT_*` environment variable (or a `.env` file); explicit flags win.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{ChartMode, ExtraSeries, QuickRange, RangeSelection, TrendConfig};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bct", version, about = "Body composition trend analyzer")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a measurement file, print a summary and plot, and optionally export.
    Process(ProcessArgs),
    /// Plot a previously exported series JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `bct process`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(ProcessArgs),
    /// Write a seeded synthetic measurement CSV.
    Sample(SampleArgs),
}

/// Trend pipeline parameters.
#[derive(Debug, Args, Clone)]
pub struct TrendArgs {
    /// Measurement noise (kg) of the trend filter.
    #[arg(long, env = "BCT_SIGMA_OBS", default_value_t = TrendConfig::default().sigma_obs)]
    pub sigma_obs: f64,

    /// Process noise (kg per day) of the trend filter.
    #[arg(long, env = "BCT_SIGMA_PROC", default_value_t = TrendConfig::default().sigma_proc)]
    pub sigma_proc: f64,

    /// Trailing window (days) for outlier detection.
    #[arg(long, env = "BCT_HAMPEL_WINDOW", default_value_t = TrendConfig::default().hampel_window)]
    pub hampel_window: usize,

    /// Outlier threshold in scaled MADs.
    #[arg(long, env = "BCT_HAMPEL_THRESHOLD", default_value_t = TrendConfig::default().hampel_threshold)]
    pub hampel_threshold: f64,

    /// Maximum trend change per day (kg).
    #[arg(long, env = "BCT_MAX_DAILY_CHANGE", default_value_t = TrendConfig::default().max_daily_change)]
    pub max_daily_change: f64,

    /// Short EMA span (days).
    #[arg(long, env = "BCT_EMA_SHORT", default_value_t = TrendConfig::default().ema_span_short)]
    pub ema_short: usize,

    /// Long EMA span (days).
    #[arg(long, env = "BCT_EMA_LONG", default_value_t = TrendConfig::default().ema_span_long)]
    pub ema_long: usize,
}

impl TrendArgs {
    pub fn to_config(&self) -> TrendConfig {
        TrendConfig {
            sigma_obs: self.sigma_obs,
            sigma_proc: self.sigma_proc,
            hampel_window: self.hampel_window,
            hampel_threshold: self.hampel_threshold,
            max_daily_change: self.max_daily_change,
            ema_span_short: self.ema_short,
            ema_span_long: self.ema_long,
        }
    }
}

/// Options shared by `process` and `tui`.
#[derive(Debug, Parser, Clone)]
pub struct ProcessArgs {
    /// Measurement CSV or workbook (date, weight, body fat %). Prompted for when omitted.
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub trend: TrendArgs,

    /// Quick date range ending at the last day.
    #[arg(long, value_enum, default_value_t = QuickRange::All)]
    pub range: QuickRange,

    /// First day to show (YYYY-MM-DD); overrides the range start.
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day to show (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Chart mode.
    #[arg(long, value_enum, default_value_t = ChartMode::Absolute)]
    pub mode: ChartMode,

    /// Also plot interpolated total mass (absolute mode).
    #[arg(long)]
    pub show_weight: bool,

    /// Also plot interpolated lean mass (absolute mode).
    #[arg(long)]
    pub show_interpolated_lean: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the daily series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the daily series (plus configuration) to JSON.
    #[arg(long = "export-series", value_name = "JSON")]
    pub export_series: Option<PathBuf>,

    /// Write a per-stage debug bundle under `debug/`.
    #[arg(long)]
    pub debug_bundle: bool,
}

impl ProcessArgs {
    pub fn range_selection(&self) -> RangeSelection {
        RangeSelection {
            quick: self.range,
            from: self.from,
            to: self.to,
        }
    }

    pub fn extras(&self) -> ExtraSeries {
        ExtraSeries {
            weight: self.show_weight,
            interpolated_lean: self.show_interpolated_lean,
        }
    }
}

/// Options for plotting a saved series.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Series JSON file produced by `bct process --export-series`.
    #[arg(long, value_name = "JSON")]
    pub series: PathBuf,

    /// Chart mode.
    #[arg(long, value_enum, default_value_t = ChartMode::Absolute)]
    pub mode: ChartMode,

    /// Also plot interpolated total mass (absolute mode).
    #[arg(long)]
    pub show_weight: bool,

    /// Also plot interpolated lean mass (absolute mode).
    #[arg(long)]
    pub show_interpolated_lean: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

impl PlotArgs {
    pub fn extras(&self) -> ExtraSeries {
        ExtraSeries {
            weight: self.show_weight,
            interpolated_lean: self.show_interpolated_lean,
        }
    }
}

/// Options for synthetic sample generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Number of calendar days to cover.
    #[arg(long, default_value_t = 180)]
    pub days: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First day (YYYY-MM-DD); defaults to `days` before today.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Output CSV path.
    #[arg(long, value_name = "CSV", default_value = "sample.csv")]
    pub out: PathBuf,
}
