//! Chart Plotter Module
//! Draws figures interactively using egui_plot.

use crate::charts::figure::{tick_label, BarFigure, Figure, HeatmapFigure, LineFigure};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const NAN_COLOR: Color32 = Color32::from_rgb(200, 200, 200);

/// Creates interactive charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    pub fn draw(ui: &mut egui::Ui, figure: &Figure) {
        ui.heading(figure.title());
        if figure.is_empty() {
            ui.label(RichText::new("No data to plot").italics());
        }
        match figure {
            Figure::Bar(fig) => Self::draw_bar_chart(ui, fig),
            Figure::Heatmap(fig) => Self::draw_heatmap(ui, fig),
            Figure::Line(fig) => Self::draw_line_chart(ui, fig),
        }
    }

    /// Grouped bars: X-axis categories, one colour per series
    pub fn draw_bar_chart(ui: &mut egui::Ui, fig: &BarFigure) {
        let categories = fig.categories.clone();
        let slot = 0.8 / fig.series.len().max(1) as f64;

        Plot::new("summary_bars")
            .legend(Legend::default())
            .x_axis_label(fig.x_label.clone())
            .y_axis_label(fig.y_label.clone())
            .x_axis_formatter(move |mark, _range| tick_label(&categories, mark.value))
            .show(ui, |plot_ui| {
                for (s, series) in fig.series.iter().enumerate() {
                    let bars: Vec<Bar> = series
                        .values
                        .iter()
                        .enumerate()
                        .filter(|(_, v)| v.is_finite())
                        .map(|(i, &v)| {
                            Bar::new(i as f64 - 0.4 + slot * (s as f64 + 0.5), v).width(slot)
                        })
                        .collect();
                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .color(Self::series_color(s))
                            .name(&series.name),
                    );
                }
            });
    }

    /// Heatmap cells as filled squares, row 0 at the top
    pub fn draw_heatmap(ui: &mut egui::Ui, fig: &HeatmapFigure) {
        let n = fig.labels.len();
        let flip = move |y: f64| n as f64 - 1.0 - y;
        let x_labels = fig.labels.clone();
        let y_labels = fig.labels.clone();

        Plot::new("correlation_heatmap")
            .data_aspect(1.0)
            .show_grid(false)
            .x_axis_formatter(move |mark, _range| tick_label(&x_labels, mark.value))
            .y_axis_formatter(move |mark, _range| tick_label(&y_labels, flip(mark.value)))
            .show(ui, |plot_ui| {
                for (i, row) in fig.values.iter().enumerate() {
                    let y = flip(i as f64);
                    for (j, &v) in row.iter().enumerate() {
                        let x = j as f64;
                        let cell = vec![
                            [x - 0.5, y - 0.5],
                            [x + 0.5, y - 0.5],
                            [x + 0.5, y + 0.5],
                            [x - 0.5, y + 0.5],
                        ];
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::new(cell))
                                .fill_color(Self::coolwarm(v))
                                .stroke(egui::Stroke::new(0.5, Color32::WHITE)),
                        );
                        if fig.annotate {
                            let text = if v.is_nan() {
                                "NaN".to_string()
                            } else {
                                format!("{:.2}", v)
                            };
                            plot_ui.text(
                                Text::new(PlotPoint::new(x, y), RichText::new(text).size(11.0))
                                    .color(Color32::BLACK),
                            );
                        }
                    }
                }
            });
    }

    /// Lines over an indexed x axis; missing points break the line
    pub fn draw_line_chart(ui: &mut egui::Ui, fig: &LineFigure) {
        let ticks = fig.x_ticks.clone();

        Plot::new("time_series")
            .legend(Legend::default())
            .x_axis_label(fig.x_label.clone())
            .y_axis_label(fig.y_label.clone())
            .x_axis_formatter(move |mark, _range| tick_label(&ticks, mark.value))
            .show(ui, |plot_ui| {
                for (s, series) in fig.series.iter().enumerate() {
                    let color = Self::series_color(s);
                    for segment in series.segments() {
                        let points: Vec<[f64; 2]> = segment.iter().map(|&(x, y)| [x, y]).collect();
                        if points.len() == 1 {
                            plot_ui.points(
                                Points::new(PlotPoints::new(points))
                                    .radius(3.0)
                                    .color(color)
                                    .name(&series.name),
                            );
                        } else {
                            plot_ui.line(
                                Line::new(PlotPoints::new(points))
                                    .color(color)
                                    .width(1.5)
                                    .name(&series.name),
                            );
                        }
                    }
                }
            });
    }

    /// Same diverging scale as the static renderer.
    fn coolwarm(value: f64) -> Color32 {
        if value.is_nan() {
            return NAN_COLOR;
        }
        let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0) as f32;
        let cold = Color32::from_rgb(59, 76, 192);
        let mid = Color32::from_rgb(221, 221, 221);
        let warm = Color32::from_rgb(180, 4, 38);
        if t < 0.5 {
            lerp_color(cold, mid, t * 2.0)
        } else {
            lerp_color(mid, warm, (t - 0.5) * 2.0)
        }
    }
}

fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgb(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_around() {
        assert_eq!(ChartPlotter::series_color(0), ChartPlotter::series_color(10));
    }

    #[test]
    fn heatmap_colors_match_scale_endpoints() {
        assert_eq!(ChartPlotter::coolwarm(-1.0), Color32::from_rgb(59, 76, 192));
        assert_eq!(ChartPlotter::coolwarm(1.0), Color32::from_rgb(180, 4, 38));
        assert_eq!(ChartPlotter::coolwarm(f64::NAN), NAN_COLOR);
    }
}
