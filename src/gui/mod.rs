//! GUI module - Interactive figure viewer

mod app;

pub use app::{run_viewer, FigureViewerApp};
