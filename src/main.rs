//! Climate Insights - World Bank climate indicator analysis
//!
//! Loads the indicator spreadsheet, prints summary statistics and the
//! correlation matrix, then exports (and optionally shows) the figures.

use anyhow::{anyhow, Context};
use clap::Parser;
use climate_insights::charts::TimeAxis;
use climate_insights::config::{self, AnalysisConfig};
use climate_insights::data::SheetLayout;
use climate_insights::{gui, Analysis};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "climate-insights")]
#[command(about = "Summary statistics, correlations and time-series charts for World Bank climate indicators")]
#[command(version)]
struct Cli {
    /// Spreadsheet to analyse (.xls, .xlsx, .ods)
    #[arg(env = "CLIMATE_INSIGHTS_INPUT", default_value = config::DEFAULT_INPUT)]
    input: PathBuf,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// 0-based row holding the year labels; data starts on the next row.
    /// Raw World Bank API_*.xls downloads keep the years one row lower: use --header-row 3
    #[arg(long, default_value_t = 2)]
    header_row: usize,

    /// Directory for exported figures
    #[arg(long, env = "CLIMATE_INSIGHTS_OUT_DIR", default_value = config::DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// Figure format: png, jpg, bmp or svg
    #[arg(long, default_value = config::DEFAULT_FORMAT)]
    format: String,

    /// Figure width in pixels
    #[arg(long, default_value_t = config::DEFAULT_FIGURE_SIZE.0)]
    width: u32,

    /// Figure height in pixels
    #[arg(long, default_value_t = config::DEFAULT_FIGURE_SIZE.1)]
    height: u32,

    /// Axis treated as time in the time-series figure
    #[arg(long, value_enum, default_value_t = TimeAxis::RowPosition)]
    time_axis: TimeAxis,

    /// Print the reports only; skip figure export
    #[arg(long)]
    no_figures: bool,

    /// Open the interactive figure viewer
    #[arg(long)]
    show: bool,

    /// Write the value table, with country names, to this CSV file
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Write the statistics and correlation matrix to this JSON file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> AnalysisConfig {
        AnalysisConfig {
            input: self.input,
            sheet: self.sheet,
            layout: SheetLayout {
                header_row: self.header_row,
            },
            out_dir: self.out_dir,
            format: self.format,
            figure_size: (self.width, self.height),
            time_axis: self.time_axis,
            render_figures: !self.no_figures,
            show: self.show,
            export_csv: self.export_csv,
            json_report: self.json,
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "climate_insights=debug"
    } else if quiet {
        "climate_insights=warn"
    } else {
        "climate_insights=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = cli.into_config().validate()?;
    let analysis = Analysis::run(&config)
        .with_context(|| format!("Failed to analyse {}", config.input.display()))?;

    println!("{}", analysis.report());

    if let Some(path) = &config.export_csv {
        analysis
            .export_csv(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(path) = &config.json_report {
        analysis
            .write_json(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if config.render_figures {
        let written = analysis
            .export_figures(&config)
            .with_context(|| format!("Failed to export figures to {}", config.out_dir.display()))?;
        info!(count = written.len(), dir = %config.out_dir.display(), "exported figures");
    }

    if config.show {
        gui::run_viewer(analysis.figures, config.figure_size)
            .map_err(|e| anyhow!("Figure viewer failed: {}", e))?;
    }

    Ok(())
}
