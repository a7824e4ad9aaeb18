//! Debug bundle writer for inspecting every pipeline stage day by day.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::domain::TrendConfig;
use crate::error::AppError;
use crate::trend::{ChannelTrend, TrendAnalysis};

/// Default directory for bundles, relative to the working directory.
pub const DEBUG_DIR: &str = "debug";

pub fn write_debug_bundle(analysis: &TrendAnalysis, config: &TrendConfig, source: &Path) -> Result<PathBuf, AppError> {
    write_debug_bundle_to(Path::new(DEBUG_DIR), analysis, config, source)
}

pub fn write_debug_bundle_to(
    dir: &Path,
    analysis: &TrendAnalysis,
    config: &TrendConfig,
    source: &Path,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::invalid_input(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let first = analysis.grid.first_date().format("%Y%m%d");
    let last = analysis.grid.last_date().format("%Y%m%d");
    let path = dir.join(format!("bct_debug_{first}_{last}_{ts}.md"));

    let file = File::create(&path)
        .map_err(|e| AppError::invalid_input(format!("Failed to create debug file: {e}")))?;
    let mut out = BufWriter::new(file);
    write_bundle(&mut out, analysis, config, source).map_err(write_err)?;
    out.flush().map_err(write_err)?;

    info!(path = %path.display(), "wrote debug bundle");
    Ok(path)
}

fn write_err(e: std::io::Error) -> AppError {
    AppError::invalid_input(format!("Failed to write debug bundle: {e}"))
}

fn write_bundle<W: Write>(
    out: &mut W,
    analysis: &TrendAnalysis,
    config: &TrendConfig,
    source: &Path,
) -> std::io::Result<()> {
    writeln!(out, "# bct debug bundle")?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(out, "- source: {}", source.display())?;
    writeln!(
        out,
        "- grid: {} to {} ({} days, {} measured)",
        analysis.grid.first_date(),
        analysis.grid.last_date(),
        analysis.grid.len(),
        analysis.grid.observed_days()
    )?;
    writeln!(
        out,
        "- filter: sigma_obs={} sigma_proc={} max_daily_change={}",
        config.sigma_obs, config.sigma_proc, config.max_daily_change
    )?;
    writeln!(
        out,
        "- hampel: window={} threshold={}",
        config.hampel_window, config.hampel_threshold
    )?;
    writeln!(out, "- ema: short={} long={}", config.ema_span_short, config.ema_span_long)?;

    write_channel(out, "Fat mass", analysis, &analysis.fat)?;
    write_channel(out, "Lean mass", analysis, &analysis.lean)?;
    Ok(())
}

fn write_channel<W: Write>(
    out: &mut W,
    title: &str,
    analysis: &TrendAnalysis,
    channel: &ChannelTrend,
) -> std::io::Result<()> {
    writeln!(out, "\n## {title}")?;
    writeln!(
        out,
        "outliers={} clamped={}",
        channel.outlier_days(),
        channel.filtered.clamped_days
    )?;
    writeln!(out, "\n| date | measured | dense | outlier | filtered | short | long |")?;
    writeln!(out, "| - | - | - | - | - | - | - |")?;

    for (i, date) in analysis.grid.dates().iter().enumerate() {
        let measured = if analysis.grid.observation(i).is_some() { "yes" } else { "" };
        let outlier = if channel.outliers[i] { "X" } else { "" };
        writeln!(
            out,
            "| {date} | {measured} | {:.4} | {outlier} | {:.4} | {:.4} | {:.4} |",
            channel.dense[i], channel.filtered.trend[i], channel.short[i], channel.long[i]
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawObservation;
    use crate::trend::analyze;
    use chrono::NaiveDate;

    #[test]
    fn bundle_has_one_row_per_day_and_channel() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        let obs = [RawObservation::new(d(1), 80.0, 25.0), RawObservation::new(d(4), 79.5, 24.8)];
        let config = TrendConfig::default();
        let analysis = analyze(&obs, &config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = write_debug_bundle_to(dir.path(), &analysis, &config, Path::new("in.csv")).unwrap();
        let text = std::fs::read_to_string(path).unwrap();

        assert!(text.starts_with("# bct debug bundle"));
        assert!(text.contains("- source: in.csv"));
        assert!(text.contains("## Fat mass"));
        assert!(text.contains("## Lean mass"));
        assert_eq!(text.matches("| 2024-02-0").count(), 8);
    }
}
