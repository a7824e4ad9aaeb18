//! Formatted terminal output.
//!
//! Formatting code lives in one place so output changes stay localized.

use crate::domain::{OutputRecord, TrendConfig};
use crate::io::ingest::IngestedData;
use crate::trend::TrendAnalysis;

/// How many row errors are listed before the rest are summarized.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// Format the run summary: input stats, configuration, filter diagnostics, and
/// the latest values of the visible window.
pub fn format_run_summary(
    ingest: &IngestedData,
    analysis: &TrendAnalysis,
    visible: &[OutputRecord],
    config: &TrendConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== bct - body composition trends ===\n");
    if let Some(stats) = &ingest.stats {
        out.push_str(&format!(
            "Input: {} measurement(s) | {} to {} | weight=[{:.2}, {:.2}] kg\n",
            stats.n_observations, stats.first_date, stats.last_date, stats.total_mass_min, stats.total_mass_max,
        ));
    }
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        ingest.rows_read,
        ingest.observations.len(),
        ingest.row_errors.len()
    ));
    out.push_str(&format_row_errors(ingest));

    out.push_str(&format!(
        "Grid: {} day(s), {} with measurements\n",
        analysis.grid.len(),
        analysis.grid.observed_days()
    ));

    out.push_str("\nSettings:\n");
    out.push_str(&format!(
        "- filter: sigma_obs={} sigma_proc={} max_daily_change={} kg\n",
        config.sigma_obs, config.sigma_proc, config.max_daily_change
    ));
    out.push_str(&format!(
        "- outliers: hampel window={} threshold={}\n",
        config.hampel_window, config.hampel_threshold
    ));
    out.push_str(&format!(
        "- smoothing: ema short={} long={}\n",
        config.ema_span_short, config.ema_span_long
    ));

    out.push_str("\nDiagnostics:\n");
    out.push_str(&format!(
        "- fat:  outlier days={} clamped days={}\n",
        analysis.fat.outlier_days(),
        analysis.fat.filtered.clamped_days
    ));
    out.push_str(&format!(
        "- lean: outlier days={} clamped days={}\n",
        analysis.lean.outlier_days(),
        analysis.lean.filtered.clamped_days
    ));

    if let (Some(first), Some(last)) = (visible.first(), visible.last()) {
        out.push_str(&format!("\nWindow: {} to {} ({} day(s))\n", first.date, last.date, visible.len()));
        out.push_str(&format!(
            "- weight:     {:.2} kg | fat {:.1}%\n",
            last.interpolated_total_mass, last.interpolated_fat_fraction
        ));
        out.push_str(&format!(
            "- fat mass:   {:.3} kg | trend short {:.3} long {:.3} | change {:+.3}\n",
            last.interpolated_fat_mass,
            last.fat_trend_short,
            last.fat_trend_long,
            last.fat_trend_short - first.fat_trend_short,
        ));
        out.push_str(&format!(
            "- lean mass:  {:.2} kg | trend short {:.3} long {:.3} | change {:+.3}\n",
            last.interpolated_lean_mass,
            last.lean_trend_short,
            last.lean_trend_long,
            last.lean_trend_short - first.lean_trend_short,
        ));
    }
    out.push('\n');

    out
}

/// List the first few skipped rows.
pub fn format_row_errors(ingest: &IngestedData) -> String {
    let mut out = String::new();
    for err in ingest.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!("  line {}: {}\n", err.line, err.message));
    }
    if ingest.row_errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!(
            "  ... and {} more\n",
            ingest.row_errors.len() - MAX_ROW_ERRORS_SHOWN
        ));
    }
    out
}

/// Tabulate the last `n` records.
pub fn format_recent_table(records: &[OutputRecord], n: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>6}\n",
        "date", "weight", "fat", "fat_st", "fat_lt", "lean_st", "lean_lt", "fat%"
    ));
    let skip = records.len().saturating_sub(n);
    for r in &records[skip..] {
        let marker = if r.observed_fat_mass.is_some() { "*" } else { " " };
        out.push_str(&format!(
            "{:<10} {:>8.2} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>6.1}{marker}\n",
            r.date.to_string(),
            r.interpolated_total_mass,
            r.interpolated_fat_mass,
            r.fat_trend_short,
            r.fat_trend_long,
            r.lean_trend_short,
            r.lean_trend_long,
            r.interpolated_fat_fraction,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::read_observations;
    use crate::trend::analyze;

    #[test]
    fn summary_mentions_window_and_diagnostics() {
        let ingest = read_observations(
            "date,weight,fat\n2024-01-01,80,25\n2024-01-05,79,24\nbad,1,1\n".as_bytes(),
        )
        .unwrap();
        let config = TrendConfig::default();
        let analysis = analyze(&ingest.observations, &config).unwrap();
        let records = analysis.records();

        let txt = format_run_summary(&ingest, &analysis, &records, &config);
        assert!(txt.contains("Rows: read=3 used=2 skipped=1"));
        assert!(txt.contains("line 4:"));
        assert!(txt.contains("Grid: 5 day(s), 2 with measurements"));
        assert!(txt.contains("Window: 2024-01-01 to 2024-01-05 (5 day(s))"));
    }

    #[test]
    fn recent_table_marks_measured_days() {
        let ingest = read_observations("date,weight,fat\n2024-01-01,80,25\n2024-01-03,80,25\n".as_bytes()).unwrap();
        let records = analyze(&ingest.observations, &TrendConfig::default()).unwrap().records();
        let table = format_recent_table(&records, 2);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2024-01-02"));
        assert!(!lines[1].ends_with('*'));
        assert!(lines[2].ends_with('*'));
    }
}
