//! Static Chart Renderer
//! Exports figures to image files with plotters.
//!
//! `.svg` paths are drawn as vector output; bitmap formats are drawn into
//! an in-memory RGB buffer and encoded by extension.

use crate::charts::figure::{tick_label, BarFigure, Figure, HeatmapFigure, LineFigure};
use image::RgbImage;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Series beyond this count are drawn without a legend entry.
const MAX_LEGEND_ENTRIES: usize = 20;
/// Annotation font bounds in pixels; the size shrinks as the grid grows.
const MAX_ANNOTATION_FONT: u32 = 14;
const MIN_ANNOTATION_FONT: u32 = 6;

const FONT: &str = "sans-serif";
const NAN_COLOR: RGBColor = RGBColor(200, 200, 200);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported figure format '{0}' (use png, jpg, bmp or svg)")]
    UnsupportedFormat(String),
    #[error("Invalid figure size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Image formats the renderer can write.
pub const SUPPORTED_FORMATS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "svg"];

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Write a figure to `path`; the format follows the file extension.
    pub fn save(figure: &Figure, path: &Path, size: (u32, u32)) -> Result<(), RenderError> {
        Self::check_size(size)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "svg" => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                Self::draw(figure, &root)?;
                root.present().map_err(draw_err)?;
            }
            "png" | "jpg" | "jpeg" | "bmp" => {
                Self::render_image(figure, size)?.save(path)?;
            }
            other => return Err(RenderError::UnsupportedFormat(other.to_string())),
        }

        info!(figure = figure.file_stem(), path = %path.display(), "saved figure");
        Ok(())
    }

    /// Export every figure into `dir` as `<stem>.<format>`, creating `dir`.
    pub fn save_all(
        figures: &[Figure],
        dir: &Path,
        format: &str,
        size: (u32, u32),
    ) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir)?;
        figures
            .iter()
            .map(|figure| {
                let path = dir.join(format!("{}.{}", figure.file_stem(), format));
                Self::save(figure, &path, size).map(|_| path)
            })
            .collect()
    }

    /// Draw a figure into an RGB image.
    pub fn render_image(figure: &Figure, size: (u32, u32)) -> Result<RgbImage, RenderError> {
        Self::check_size(size)?;
        let (width, height) = size;
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
            Self::draw(figure, &root)?;
            root.present().map_err(draw_err)?;
        }
        RgbImage::from_raw(width, height, buffer).ok_or(RenderError::InvalidSize { width, height })
    }

    fn check_size((width, height): (u32, u32)) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        Ok(())
    }

    fn draw<DB: DrawingBackend>(
        figure: &Figure,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), RenderError> {
        root.fill(&WHITE).map_err(draw_err)?;
        debug!(figure = figure.file_stem(), "drawing figure");
        match figure {
            Figure::Bar(fig) => Self::draw_bar(fig, root),
            Figure::Heatmap(fig) => Self::draw_heatmap(fig, root),
            Figure::Line(fig) => Self::draw_line(fig, root),
        }
    }

    /// Grouped bars; each category owns 80% of a unit slot.
    fn draw_bar<DB: DrawingBackend>(
        fig: &BarFigure,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), RenderError> {
        let n = fig.categories.len().max(1);
        let (lo, hi) = value_range(
            fig.series.iter().flat_map(|s| s.values.iter().copied()),
            true,
        );

        let mut chart = ChartBuilder::on(root)
            .caption(&fig.title, (FONT, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(100)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), lo..hi)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| tick_label(&fig.categories, *x))
            .x_desc(fig.x_label.as_str())
            .y_desc(fig.y_label.as_str())
            .draw()
            .map_err(draw_err)?;

        let slot = 0.8 / fig.series.len().max(1) as f64;
        for (s, series) in fig.series.iter().enumerate() {
            let color = Palette99::pick(s).to_rgba();
            let bars = series
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(move |(i, v)| {
                    let x0 = i as f64 - 0.4 + s as f64 * slot;
                    Rectangle::new([(x0, 0.0), (x0 + slot, *v)], color.filled())
                });
            let anno = chart.draw_series(bars).map_err(draw_err)?;
            if s < MAX_LEGEND_ENTRIES {
                anno.label(series.name.as_str()).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
            }
        }

        if !fig.series.is_empty() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperRight)
                .draw()
                .map_err(draw_err)?;
        }
        Ok(())
    }

    /// Row 0 is drawn at the top; NaN cells are grey.
    fn draw_heatmap<DB: DrawingBackend>(
        fig: &HeatmapFigure,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), RenderError> {
        let n = fig.labels.len();
        if n == 0 {
            root.titled("No numeric columns to correlate", (FONT, 28))
                .map_err(draw_err)?;
            return Ok(());
        }

        let extent = n as f64 - 0.5;
        let mut chart = ChartBuilder::on(root)
            .caption(&fig.title, (FONT, 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(120)
            .build_cartesian_2d(-0.5f64..extent, -0.5f64..extent)
            .map_err(draw_err)?;

        let flip = |y: f64| n as f64 - 1.0 - y;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_formatter(&|x| tick_label(&fig.labels, *x))
            .y_label_formatter(&|y| tick_label(&fig.labels, flip(*y)))
            .draw()
            .map_err(draw_err)?;

        let cells: Vec<(f64, f64, f64)> = fig
            .values
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(j, v)| (j as f64, flip(i as f64), *v))
            })
            .collect();

        chart
            .draw_series(cells.iter().map(|&(x, y, v)| {
                Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    coolwarm(v).filled(),
                )
            }))
            .map_err(draw_err)?;

        if fig.annotate {
            let font = annotation_font_size(root.dim_in_pixel().0, n);
            debug!(columns = n, font, "annotating heatmap cells");
            let style = TextStyle::from((FONT, font).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart
                .draw_series(cells.iter().map(|&(x, y, v)| {
                    let text = if v.is_nan() {
                        "NaN".to_string()
                    } else {
                        format!("{:.2}", v)
                    };
                    Text::new(text, (x, y), style.clone())
                }))
                .map_err(draw_err)?;
        }
        Ok(())
    }

    /// Missing points split a series into separate segments.
    fn draw_line<DB: DrawingBackend>(
        fig: &LineFigure,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), RenderError> {
        let len = fig
            .series
            .iter()
            .map(|s| s.points.len())
            .chain(std::iter::once(fig.x_ticks.len()))
            .max()
            .unwrap_or(0);
        let x_max = (len.max(2) - 1) as f64;
        let (lo, hi) = value_range(
            fig.series
                .iter()
                .flat_map(|s| s.points.iter().flatten().copied()),
            false,
        );

        let mut chart = ChartBuilder::on(root)
            .caption(&fig.title, (FONT, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(100)
            .build_cartesian_2d(0f64..x_max, lo..hi)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_labels(len.clamp(2, 20))
            .x_label_formatter(&|x| tick_label(&fig.x_ticks, *x))
            .x_desc(fig.x_label.as_str())
            .y_desc(fig.y_label.as_str())
            .draw()
            .map_err(draw_err)?;

        let mut labelled = false;
        for (s, series) in fig.series.iter().enumerate() {
            let color = Palette99::pick(s).to_rgba();
            for (k, segment) in series.segments().into_iter().enumerate() {
                let anno = if segment.len() == 1 {
                    chart
                        .draw_series(segment.into_iter().map(|p| Circle::new(p, 3, color.filled())))
                        .map_err(draw_err)?
                } else {
                    chart
                        .draw_series(LineSeries::new(segment, color.stroke_width(2)))
                        .map_err(draw_err)?
                };
                if k == 0 && s < MAX_LEGEND_ENTRIES {
                    labelled = true;
                    anno.label(series.name.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                }
            }
        }

        if labelled {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperLeft)
                .draw()
                .map_err(draw_err)?;
        }
        Ok(())
    }
}

/// Padded value range over the finite values; optionally includes zero.
fn value_range(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { lo.abs().max(1.0) * 0.5 };
    (lo - pad, hi + pad)
}

/// Diverging blue-white-red scale over [-1, 1].
fn coolwarm(value: f64) -> RGBColor {
    if value.is_nan() {
        return NAN_COLOR;
    }
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0).clamp(0.0, 1.0);
    let (from, to, frac) = if t < 0.5 {
        (COLD, MID, t * 2.0)
    } else {
        (MID, WARM, (t - 0.5) * 2.0)
    };
    let mix = |a: f64, b: f64| (a + (b - a) * frac).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Font size that keeps a `-0.00` label inside a cell of a `width`-pixel grid.
fn annotation_font_size(width: u32, columns: usize) -> u32 {
    let cell = width / columns.max(1) as u32;
    (cell / 4).clamp(MIN_ANNOTATION_FONT, MAX_ANNOTATION_FONT)
}
