//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! x is the day offset from the first visible record. Lines are drawn first so
//! that measurement markers overlay them.

use crate::domain::{ChartMode, ExtraSeries, OutputRecord, SeriesFile};
use crate::report::{daily_changes, trend_residuals};

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    Line,
    Points,
}

/// One drawable series.
#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub label: &'static str,
    pub glyph: char,
    pub draw: Draw,
    pub points: Vec<(f64, f64)>,
}

/// Render the visible window in the requested mode.
///
/// `extras` only affects absolute mode.
pub fn render_ascii_plot(
    records: &[OutputRecord],
    mode: ChartMode,
    extras: ExtraSeries,
    width: usize,
    height: usize,
) -> String {
    if records.is_empty() {
        return "Plot: no data in range\n".to_string();
    }
    match mode {
        ChartMode::Absolute => {
            let mut out = String::new();
            if extras.weight {
                out.push_str(&render_panel("total mass (kg)", records, &weight_series(records), width, height));
            }
            out.push_str(&render_panel("fat mass (kg)", records, &fat_series(records), width, height));
            let lean = lean_series(records, extras.interpolated_lean);
            out.push_str(&render_panel("lean mass (kg)", records, &lean, width, height));
            out
        }
        ChartMode::DailyChange => {
            render_panel("trend change (kg/day)", records, &change_series(records), width, height)
        }
        ChartMode::Difference => {
            render_panel("observed - trend (kg)", records, &difference_series(records), width, height)
        }
    }
}

/// Render a plot from a saved series file.
pub fn render_ascii_plot_from_series(
    series: &SeriesFile,
    mode: ChartMode,
    extras: ExtraSeries,
    width: usize,
    height: usize,
) -> String {
    render_ascii_plot(&series.records, mode, extras, width, height)
}

fn day_x(records: &[OutputRecord], r: &OutputRecord) -> f64 {
    (r.date - records[0].date).num_days() as f64
}

/// Fat-mass panel: long trend, short trend, measurements.
pub fn fat_series(records: &[OutputRecord]) -> Vec<PlotSeries> {
    vec![
        PlotSeries {
            label: "long trend",
            glyph: '=',
            draw: Draw::Line,
            points: records.iter().map(|r| (day_x(records, r), r.fat_trend_long)).collect(),
        },
        PlotSeries {
            label: "short trend",
            glyph: '-',
            draw: Draw::Line,
            points: records.iter().map(|r| (day_x(records, r), r.fat_trend_short)).collect(),
        },
        PlotSeries {
            label: "measured",
            glyph: 'o',
            draw: Draw::Points,
            points: records
                .iter()
                .filter_map(|r| r.observed_fat_mass.map(|v| (day_x(records, r), v)))
                .collect(),
        },
    ]
}

/// Total-mass panel: interpolated weight and measurements.
pub fn weight_series(records: &[OutputRecord]) -> Vec<PlotSeries> {
    vec![
        PlotSeries {
            label: "interpolated",
            glyph: 'w',
            draw: Draw::Line,
            points: records.iter().map(|r| (day_x(records, r), r.interpolated_total_mass)).collect(),
        },
        PlotSeries {
            label: "measured",
            glyph: 'o',
            draw: Draw::Points,
            points: records
                .iter()
                .filter_map(|r| r.observed_total_mass.map(|v| (day_x(records, r), v)))
                .collect(),
        },
    ]
}

/// Lean-mass panel: optional interpolated lean, long trend, short trend, measurements.
pub fn lean_series(records: &[OutputRecord], with_interpolated: bool) -> Vec<PlotSeries> {
    let mut series = Vec::with_capacity(4);
    if with_interpolated {
        series.push(PlotSeries {
            label: "interpolated",
            glyph: 'i',
            draw: Draw::Line,
            points: records.iter().map(|r| (day_x(records, r), r.interpolated_lean_mass)).collect(),
        });
    }
    series.extend([
        PlotSeries {
            label: "long trend",
            glyph: '=',
            draw: Draw::Line,
            points: records.iter().map(|r| (day_x(records, r), r.lean_trend_long)).collect(),
        },
        PlotSeries {
            label: "short trend",
            glyph: '-',
            draw: Draw::Line,
            points: records.iter().map(|r| (day_x(records, r), r.lean_trend_short)).collect(),
        },
        PlotSeries {
            label: "measured",
            glyph: 'o',
            draw: Draw::Points,
            points: records
                .iter()
                .filter_map(|r| r.observed_lean_mass.map(|v| (day_x(records, r), v)))
                .collect(),
        },
    ]);
    series
}

/// Daily-change panel for both short trends.
pub fn change_series(records: &[OutputRecord]) -> Vec<PlotSeries> {
    let changes = daily_changes(records);
    let x = |c: &crate::report::DailyChange| (c.date - records[0].date).num_days() as f64;
    vec![
        PlotSeries {
            label: "fat",
            glyph: 'f',
            draw: Draw::Line,
            points: changes.iter().map(|c| (x(c), c.fat_change)).collect(),
        },
        PlotSeries {
            label: "lean",
            glyph: 'l',
            draw: Draw::Line,
            points: changes.iter().map(|c| (x(c), c.lean_change)).collect(),
        },
    ]
}

/// Observed-minus-trend panel for both mass channels.
pub fn difference_series(records: &[OutputRecord]) -> Vec<PlotSeries> {
    let residuals = trend_residuals(records);
    let x = |r: &crate::report::TrendResidual| (r.date - records[0].date).num_days() as f64;
    vec![
        PlotSeries {
            label: "fat",
            glyph: 'f',
            draw: Draw::Points,
            points: residuals
                .iter()
                .filter_map(|r| r.fat_difference.map(|v| (x(r), v)))
                .collect(),
        },
        PlotSeries {
            label: "lean",
            glyph: 'l',
            draw: Draw::Points,
            points: residuals
                .iter()
                .filter_map(|r| r.lean_difference.map(|v| (x(r), v)))
                .collect(),
        },
    ]
}

fn render_panel(
    title: &str,
    records: &[OutputRecord],
    series: &[PlotSeries],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let first = records[0].date;
    let last = records[records.len() - 1].date;
    let x_max = ((last - first).num_days() as f64).max(1.0);

    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for s in series.iter().filter(|s| s.draw == Draw::Line) {
        draw_curve(&mut grid, &s.points, x_max, y_min, y_max, s.glyph);
    }
    for s in series.iter().filter(|s| s.draw == Draw::Points) {
        for &(x, y) in &s.points {
            grid[map_y(y, y_min, y_max, height)][map_x(x, x_max, width)] = s.glyph;
        }
    }

    let legend: Vec<String> = series.iter().map(|s| format!("{} {}", s.glyph, s.label)).collect();

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {title} | {first} to {last} | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out.push_str(&format!("Legend: {}\n", legend.join("  ")));
    out
}

fn y_range(series: &[PlotSeries]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in series.iter().flat_map(|s| s.points.iter()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat data: open a small band around the value.
        Some((min_y - 0.5, max_y + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64, ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let px = map_x(x, x_max, width);
        let py = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, px, py, ch),
            None => grid[py][px] = ch,
        }
        prev = Some((px, py));
    }
}

/// Integer line drawing (Bresenham-ish). Later lines overwrite earlier ones.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
