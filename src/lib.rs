//! Climate Insights - World Bank climate indicator analysis
//!
//! Loads a World Bank indicator spreadsheet into a country table and a
//! year-labelled value table, then produces descriptive statistics, a
//! correlation matrix and time-series figures.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod stats;

pub use analysis::{Analysis, AnalysisError};
pub use config::AnalysisConfig;
