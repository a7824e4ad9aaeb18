//! Plotters-powered trend chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! x values are day offsets from the first visible day; the caller supplies a
//! formatter that turns them back into dates.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::{Draw, PlotSeries};

/// A render-only chart description. All series and bounds are computed outside
/// the render call.
pub struct TrendPlottersChart<'a> {
    pub series: &'a [PlotSeries],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
    pub fmt_x: &'a dyn Fn(f64) -> String,
    pub fmt_y: &'a dyn Fn(f64) -> String,
}

/// Terminal palette per series glyph.
fn series_color(series: &PlotSeries) -> RGBColor {
    match series.glyph {
        '=' => RGBColor(255, 165, 0), // long trend: orange
        '-' => RGBColor(0, 255, 255), // short trend: cyan
        'f' => RGBColor(255, 255, 0),
        'l' => RGBColor(0, 255, 0),
        'w' => RGBColor(255, 0, 255),
        'i' => RGBColor(160, 160, 160),
        _ => RGBColor(255, 255, 255),
    }
}

impl Widget for TrendPlottersChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a tiny chart; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Lines first, then measurement dots on top.
            for series in self.series.iter().filter(|s| s.draw == Draw::Line) {
                let color = series_color(series);
                chart.draw_series(LineSeries::new(series.points.iter().copied(), &color))?;
            }
            // `Pixel` rather than `Circle`: the backend maps circle radii to canvas
            // units and draws them far too large.
            for series in self.series.iter().filter(|s| s.draw == Draw::Points) {
                let color = series_color(series);
                chart.draw_series(series.points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
