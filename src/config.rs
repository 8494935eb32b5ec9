//! Run configuration for the analysis pipeline.

use crate::charts::{TimeAxis, SUPPORTED_FORMATS};
use crate::data::SheetLayout;
use std::path::PathBuf;
use thiserror::Error;

/// World Bank climate-change indicator export.
pub const DEFAULT_INPUT: &str = "API_CLIMATE_CHANGE_WB.xls";
pub const DEFAULT_OUT_DIR: &str = "figures";
pub const DEFAULT_FORMAT: &str = "png";
pub const DEFAULT_FIGURE_SIZE: (u32, u32) = (1600, 1200);

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Figure size must be non-zero, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Unsupported figure format '{0}' (use one of: png, jpg, jpeg, bmp, svg)")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    /// Worksheet name; first sheet when `None`.
    pub sheet: Option<String>,
    pub layout: SheetLayout,
    pub out_dir: PathBuf,
    /// File extension for exported figures.
    pub format: String,
    pub figure_size: (u32, u32),
    pub time_axis: TimeAxis,
    pub render_figures: bool,
    pub show: bool,
    pub export_csv: Option<PathBuf>,
    pub json_report: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            sheet: None,
            layout: SheetLayout::default(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            format: DEFAULT_FORMAT.to_string(),
            figure_size: DEFAULT_FIGURE_SIZE,
            time_axis: TimeAxis::default(),
            render_figures: true,
            show: false,
            export_csv: None,
            json_report: None,
        }
    }
}

impl AnalysisConfig {
    /// Normalise the figure format and reject unusable settings.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let (width, height) = self.figure_size;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidSize { width, height });
        }
        self.format = self.format.trim_start_matches('.').to_ascii_lowercase();
        if !SUPPORTED_FORMATS.contains(&self.format.as_str()) {
            return Err(ConfigError::UnsupportedFormat(self.format));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_matches_fixed_pipeline() {
        let config = AnalysisConfig::default().validate().unwrap();
        assert_eq!(config.input, PathBuf::from("API_CLIMATE_CHANGE_WB.xls"));
        assert_eq!(config.layout.header_row, 2);
        assert_eq!(config.time_axis, TimeAxis::RowPosition);
        assert!(config.render_figures);
        assert!(!config.show);
    }

    #[test]
    fn format_is_normalised() {
        let config = AnalysisConfig {
            format: ".SVG".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(config.format, "svg");
    }

    #[test]
    fn rejects_bad_settings() {
        let zero = AnalysisConfig {
            figure_size: (0, 600),
            ..Default::default()
        };
        assert_eq!(
            zero.validate().unwrap_err(),
            ConfigError::InvalidSize {
                width: 0,
                height: 600
            }
        );

        let gif = AnalysisConfig {
            format: "gif".to_string(),
            ..Default::default()
        };
        assert_eq!(
            gif.validate().unwrap_err(),
            ConfigError::UnsupportedFormat("gif".to_string())
        );
    }
}
