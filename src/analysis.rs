//! Analysis pipeline: load, describe, correlate, build figures.

use crate::charts::{Figure, FigureBuilder, RenderError, StaticChartRenderer, TimeAxis};
use crate::config::{AnalysisConfig, ConfigError};
use crate::data::{
    CountryTable, DataProcessor, LoaderError, ProcessorError, TableLoader, ValueTable,
};
use crate::stats::{CorrelationCalculator, CorrelationMatrix, DescribeTable, StatsCalculator};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Process(#[from] ProcessorError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Failed to write JSON report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct JsonReport<'a> {
    entities: usize,
    describe: &'a DescribeTable,
    correlation: &'a CorrelationMatrix,
}

/// Everything derived from one input file.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub countries: CountryTable,
    pub values: ValueTable,
    pub describe: DescribeTable,
    pub correlation: CorrelationMatrix,
    /// Summary bars, correlation heatmap, time series, in that order.
    pub figures: Vec<Figure>,
}

impl Analysis {
    /// Load the configured spreadsheet and compute all reports.
    pub fn run(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let mut loader = TableLoader::new().with_layout(config.layout);
        if let Some(sheet) = &config.sheet {
            loader = loader.with_sheet(sheet.clone());
        }
        let (countries, values) = loader.load(&config.input)?;
        Self::from_tables(countries, values, config.time_axis)
    }

    /// Compute reports and figures for already-loaded tables.
    pub fn from_tables(
        countries: CountryTable,
        values: ValueTable,
        time_axis: TimeAxis,
    ) -> Result<Self, AnalysisError> {
        let describe = StatsCalculator::describe(&values);
        let correlation = CorrelationCalculator::correlation(&values);

        let time_series = match time_axis {
            TimeAxis::RowPosition => FigureBuilder::time_series_by_row(&values),
            TimeAxis::Year => {
                let years = DataProcessor::transpose_years(&values, &countries)?;
                FigureBuilder::time_series_by_year(&years)
            }
        };

        let figures = vec![
            FigureBuilder::summary(&describe),
            FigureBuilder::correlation(&correlation),
            time_series,
        ];
        for figure in figures.iter().filter(|f| f.is_empty()) {
            warn!(figure = figure.file_stem(), "figure has no data");
        }

        Ok(Self {
            countries,
            values,
            describe,
            correlation,
            figures,
        })
    }

    /// Text report: describe table, then the correlation matrix.
    pub fn report(&self) -> String {
        format!(
            "Summary statistics\n==================\n{}\nCorrelation matrix\n==================\n{}",
            self.describe, self.correlation
        )
    }

    pub fn write_json(&self, path: &Path) -> Result<(), AnalysisError> {
        let report = JsonReport {
            entities: self.countries.len(),
            describe: &self.describe,
            correlation: &self.correlation,
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &report)?;
        info!(path = %path.display(), "wrote json report");
        Ok(())
    }

    pub fn export_csv(&self, path: &Path) -> Result<(), AnalysisError> {
        DataProcessor::export_csv(&self.values, &self.countries, path)?;
        Ok(())
    }

    /// Save every figure into the configured output directory.
    pub fn export_figures(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>, AnalysisError> {
        Ok(StaticChartRenderer::save_all(
            &self.figures,
            &config.out_dir,
            &config.format,
            config.figure_size,
        )?)
    }
}
