//! Figure Model Module
//! Plain figure values built from the reports. Renderers and the viewer
//! draw these; nothing here touches a drawing backend.

use crate::data::{ValueTable, YearTable};
use crate::stats::{CorrelationMatrix, DescribeTable, NUMERIC_STATS};

/// Which axis of the value table is treated as time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TimeAxis {
    /// x = row position, one line per column.
    #[default]
    RowPosition,
    /// x = year column, one line per entity (needs the transposed table).
    Year,
}

/// One named bar series across all categories.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Grouped bar chart: a group of bars per category.
#[derive(Debug, Clone, PartialEq)]
pub struct BarFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

/// Annotated square heatmap with values in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapFigure {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub annotate: bool,
}

/// One line; `None` points break it into segments.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<Option<f64>>,
}

impl LineSeries {
    /// Contiguous runs of present points as `(x, y)` pairs.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (x, point) in self.points.iter().enumerate() {
            match point {
                Some(y) if !y.is_nan() => current.push((x as f64, *y)),
                _ => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// Line chart over an indexed x axis with optional tick labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Label for x = i; empty means plain numbers.
    pub x_ticks: Vec<String>,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Bar(BarFigure),
    Heatmap(HeatmapFigure),
    Line(LineFigure),
}

impl Figure {
    pub fn title(&self) -> &str {
        match self {
            Figure::Bar(f) => &f.title,
            Figure::Heatmap(f) => &f.title,
            Figure::Line(f) => &f.title,
        }
    }

    /// File stem used when exporting.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Figure::Bar(_) => "summary_statistics",
            Figure::Heatmap(_) => "correlation_heatmap",
            Figure::Line(_) => "time_series",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Figure::Bar(f) => f.series.is_empty(),
            Figure::Heatmap(f) => f.labels.is_empty(),
            Figure::Line(f) => f.series.iter().all(|s| s.segments().is_empty()),
        }
    }
}

/// Builds figures from tables and reports.
pub struct FigureBuilder;

impl FigureBuilder {
    /// Bar per numeric statistic (`count` .. `max`) per numeric column.
    pub fn summary(describe: &DescribeTable) -> Figure {
        let series = describe
            .numeric_columns()
            .map(|(label, stats)| BarSeries {
                name: label.to_string(),
                values: stats.values().to_vec(),
            })
            .collect();

        Figure::Bar(BarFigure {
            title: "Summary Statistics for Each Indicator".to_string(),
            x_label: "Indicators".to_string(),
            y_label: "Values".to_string(),
            categories: NUMERIC_STATS.iter().map(|s| s.to_string()).collect(),
            series,
        })
    }

    pub fn correlation(matrix: &CorrelationMatrix) -> Figure {
        Figure::Heatmap(HeatmapFigure {
            title: "Correlation between Numeric Indicators".to_string(),
            labels: matrix.labels.clone(),
            values: matrix.values.clone(),
            annotate: true,
        })
    }

    /// Lines over row position, one per numeric column.
    pub fn time_series_by_row(values: &ValueTable) -> Figure {
        let series = values
            .numeric_columns()
            .into_iter()
            .map(|(name, points)| LineSeries { name, points })
            .collect();

        Figure::Line(LineFigure {
            title: "Change in the Indicators over Time".to_string(),
            x_label: "Row position".to_string(),
            y_label: "Values".to_string(),
            x_ticks: Vec::new(),
            series,
        })
    }

    /// Lines over years, one per entity.
    pub fn time_series_by_year(years: &YearTable) -> Figure {
        let series = years
            .entities
            .iter()
            .zip(&years.series)
            .map(|(name, points)| LineSeries {
                name: name.clone(),
                points: points.clone(),
            })
            .collect();

        Figure::Line(LineFigure {
            title: "Change in the Indicators over Time".to_string(),
            x_label: "Years".to_string(),
            y_label: "Values".to_string(),
            x_ticks: years.years.clone(),
            series,
        })
    }
}

/// Label for an integral position on an indexed axis.
pub(crate) fn tick_label(labels: &[String], position: f64) -> String {
    let index = position.round();
    if (position - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    if labels.is_empty() {
        return format!("{}", index as i64);
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}
