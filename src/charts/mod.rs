//! Charts module - Figure model, interactive plotting and static export

mod figure;
mod plotter;
mod renderer;

pub use figure::{
    BarFigure, BarSeries, Figure, FigureBuilder, HeatmapFigure, LineFigure, LineSeries, TimeAxis,
};
pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer, SUPPORTED_FORMATS};
