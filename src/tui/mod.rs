//! Ratatui-based terminal UI.
//!
//! The TUI shows the daily trend series of one measurement file. Quick-range keys
//! pick the visible window, `m` cycles the chart mode, and series toggles hide
//! individual lines. In absolute mode fat and lean mass get separate panels since
//! their scales differ by tens of kilograms; interpolated total mass gets a third
//! panel when switched on.

use std::io;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tracing::debug;

use crate::app::pipeline::{RunOutput, run_pipeline};
use crate::cli::ProcessArgs;
use crate::domain::{ChartMode, ExtraSeries, OutputRecord, QuickRange, RangeSelection, RunConfig};
use crate::error::AppError;
use crate::plot::{Draw, PlotSeries, change_series, difference_series, fat_series, lean_series, weight_series};

mod plotters_chart;

use plotters_chart::TrendPlottersChart;

/// Start the TUI.
pub fn run(args: ProcessArgs) -> Result<(), AppError> {
    // File selection and the first pipeline run happen before raw mode so prompts
    // and errors print normally.
    let config = crate::app::run_config_from_args(&args)?;
    let run = run_pipeline(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::internal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, run);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::internal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::internal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Which series are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SeriesToggles {
    fat: bool,
    lean: bool,
    observed: bool,
    extras: ExtraSeries,
}

impl Default for SeriesToggles {
    fn default() -> Self {
        Self {
            fat: true,
            lean: true,
            observed: true,
            extras: ExtraSeries::default(),
        }
    }
}

/// One chart panel, ready to render.
#[derive(Debug, Clone)]
struct Panel {
    title: String,
    y_label: &'static str,
    series: Vec<PlotSeries>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

struct App {
    config: RunConfig,
    run: RunOutput,
    selection: RangeSelection,
    mode: ChartMode,
    toggles: SeriesToggles,
    status: String,
}

impl App {
    fn new(config: RunConfig, run: RunOutput) -> Self {
        let status = format!(
            "Loaded {} measurement(s), {} row(s) skipped.",
            run.ingest.observations.len(),
            run.ingest.row_errors.len()
        );
        Self {
            selection: config.range,
            mode: config.mode,
            toggles: SeriesToggles {
                extras: config.extras,
                ..SeriesToggles::default()
            },
            config,
            run,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::internal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::internal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::internal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('1') => self.set_range(QuickRange::Month),
            KeyCode::Char('3') => self.set_range(QuickRange::Quarter),
            KeyCode::Char('y') => self.set_range(QuickRange::Year),
            KeyCode::Char('a') => self.set_range(QuickRange::All),
            KeyCode::Char('m') => {
                self.mode = self.mode.next();
                self.status = format!("mode: {}", self.mode.display_name());
            }
            KeyCode::Char('f') => {
                self.toggles.fat = !self.toggles.fat;
                self.status = format!("fat series: {}", on_off(self.toggles.fat));
            }
            KeyCode::Char('l') => {
                self.toggles.lean = !self.toggles.lean;
                self.status = format!("lean series: {}", on_off(self.toggles.lean));
            }
            KeyCode::Char('o') => {
                self.toggles.observed = !self.toggles.observed;
                self.status = format!("measurements: {}", on_off(self.toggles.observed));
            }
            KeyCode::Char('w') => {
                self.toggles.extras.weight = !self.toggles.extras.weight;
                self.status = format!("interpolated weight: {}", on_off(self.toggles.extras.weight));
            }
            KeyCode::Char('i') => {
                let extras = &mut self.toggles.extras;
                extras.interpolated_lean = !extras.interpolated_lean;
                self.status = format!("interpolated lean: {}", on_off(extras.interpolated_lean));
            }
            KeyCode::Char('d') => {
                self.status =
                    match crate::debug::write_debug_bundle(&self.run.analysis, &self.config.trend, &self.config.input)
                    {
                        Ok(path) => format!("Wrote debug bundle: {}", path.display()),
                        Err(err) => format!("Debug write failed: {err}"),
                    };
            }
            _ => {}
        }
        false
    }

    fn set_range(&mut self, quick: QuickRange) {
        // Quick ranges replace explicit bounds from the command line.
        self.selection = RangeSelection {
            quick,
            from: None,
            to: None,
        };
        self.status = format!("range: {}", quick.display_name());
        debug!(range = quick.display_name(), "changed range");
    }

    fn visible(&self) -> Result<&[OutputRecord], AppError> {
        crate::report::apply_selection(&self.run.records, &self.selection)
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("bct", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {}", self.config.input.display())),
        ]));

        let visible = self.visible().unwrap_or(&[]);
        let window = match (visible.first(), visible.last()) {
            (Some(first), Some(last)) => format!("{} to {} ({} days)", first.date, last.date, visible.len()),
            _ => "-".to_string(),
        };
        lines.push(Line::from(Span::styled(
            format!(
                "window: {window} | range: {} | mode: {}",
                self.selection.quick.display_name(),
                self.mode.display_name()
            ),
            Style::default().fg(Color::Gray),
        )));

        if let (Some(first), Some(last)) = (visible.first(), visible.last()) {
            lines.push(Line::from(Span::styled(
                format!(
                    "weight {:.2} kg | fat {:.1}% | fat trend {:.3} ({:+.3}) | lean trend {:.3} ({:+.3})",
                    last.interpolated_total_mass,
                    last.interpolated_fat_fraction,
                    last.fat_trend_short,
                    last.fat_trend_short - first.fat_trend_short,
                    last.lean_trend_short,
                    last.lean_trend_short - first.lean_trend_short,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let visible = match self.visible() {
            Ok(v) => v,
            Err(err) => {
                let msg = Paragraph::new(err.to_string())
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(msg, area);
                return;
            }
        };

        let panels = chart_panels(visible, self.mode, self.toggles);
        if panels.is_empty() {
            let msg = Paragraph::new("Nothing to show (no data in range or every series hidden).")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        }

        let constraints = vec![Constraint::Ratio(1, panels.len() as u32); panels.len()];
        let rects = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let Some(first_date) = visible.first().map(|r| r.date) else {
            return;
        };
        for (panel, rect) in panels.iter().zip(rects.iter()) {
            draw_panel(frame, *rect, panel, first_date);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "1 month  3 quarter  y year  a all  m mode  f fat  l lean  o measured  w weight  i interp lean  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_panel(frame: &mut ratatui::Frame<'_>, area: Rect, panel: &Panel, first_date: NaiveDate) {
    let block = Block::default().title(panel.title.as_str()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let fmt_x = move |v: f64| {
        first_date
            .checked_add_days(Days::new(v.max(0.0).round() as u64))
            .map(|d| d.format("%m-%d").to_string())
            .unwrap_or_default()
    };
    let widget = TrendPlottersChart {
        series: &panel.series,
        x_bounds: panel.x_bounds,
        y_bounds: panel.y_bounds,
        y_label: panel.y_label,
        fmt_x: &fmt_x,
        fmt_y: &fmt_axis_y,
    };
    frame.render_widget(widget, inner);
}

fn on_off(v: bool) -> &'static str {
    if v { "on" } else { "off" }
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.1}")
}

/// Build the panels for the visible window, honoring mode and toggles.
fn chart_panels(visible: &[OutputRecord], mode: ChartMode, toggles: SeriesToggles) -> Vec<Panel> {
    if visible.is_empty() {
        return Vec::new();
    }

    let keep_measured = |series: Vec<PlotSeries>| -> Vec<PlotSeries> {
        series
            .into_iter()
            .filter(|s| toggles.observed || s.draw != Draw::Points)
            .collect()
    };

    let candidates: Vec<(String, &'static str, Vec<PlotSeries>)> = match mode {
        ChartMode::Absolute => {
            let mut out = Vec::new();
            if toggles.extras.weight {
                out.push(("Total mass".to_string(), "kg", keep_measured(weight_series(visible))));
            }
            if toggles.fat {
                out.push(("Fat mass".to_string(), "kg", keep_measured(fat_series(visible))));
            }
            if toggles.lean {
                let lean = lean_series(visible, toggles.extras.interpolated_lean);
                out.push(("Lean mass".to_string(), "kg", keep_measured(lean)));
            }
            out
        }
        ChartMode::DailyChange => vec![(
            "Daily change of short trend".to_string(),
            "kg/day",
            channel_filter(change_series(visible), toggles),
        )],
        ChartMode::Difference => vec![(
            "Measured minus short trend".to_string(),
            "kg",
            channel_filter(difference_series(visible), toggles),
        )],
    };

    let x_max = visible
        .last()
        .map(|r| (r.date - visible[0].date).num_days() as f64)
        .unwrap_or(0.0)
        .max(1.0);

    candidates
        .into_iter()
        .filter(|(_, _, series)| series.iter().any(|s| !s.points.is_empty()))
        .map(|(title, y_label, series)| {
            let y_bounds = y_bounds(&series);
            Panel {
                title,
                y_label,
                series,
                x_bounds: [0.0, x_max],
                y_bounds,
            }
        })
        .collect()
}

/// Keep the `f` / `l` series of a two-channel panel according to the toggles.
fn channel_filter(series: Vec<PlotSeries>, toggles: SeriesToggles) -> Vec<PlotSeries> {
    series
        .into_iter()
        .filter(|s| match s.glyph {
            'f' => toggles.fat,
            'l' => toggles.lean,
            _ => true,
        })
        .collect()
}

fn y_bounds(series: &[PlotSeries]) -> [f64; 2] {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in series.iter().flat_map(|s| s.points.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        return [0.0, 1.0];
    }
    if y_max <= y_min {
        return [y_min - 0.5, y_max + 0.5];
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min - pad, y_max + pad]
}
