//! Spreadsheet Loader Module
//! Reads a World Bank indicator export and splits it into country labels
//! and year-labelled values.

use crate::data::table::{
    CountryTable, RawCell, RawRow, RawSheet, SheetLayout, TableColumn, ValueTable,
};
use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::PolarsError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read spreadsheet {}: {message}", path.display())]
    Spreadsheet { path: PathBuf, message: String },
    #[error("Header row {header_row} not found: sheet has only {rows} rows")]
    MissingHeaderRow { header_row: usize, rows: usize },
    #[error("Sheet has {width} column(s); expected a label column plus at least one value column")]
    NoValueColumns { width: usize },
    #[error("Column {column} has no label in header row {header_row}")]
    MissingColumnLabel { column: usize, header_row: usize },
    #[error("Column label '{label}' appears more than once")]
    DuplicateColumnLabel { label: String },
    #[error("Row {row} has a non-text entity label: {value}")]
    NonTextEntityLabel { row: usize, value: String },
    #[error("Failed to build table: {0}")]
    Table(#[from] PolarsError),
}

/// Loads World Bank style sheets: metadata rows, a header row of years,
/// then one row per entity with its name in column 0.
pub struct TableLoader {
    layout: SheetLayout,
    sheet: Option<String>,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TableLoader {
    pub fn new() -> Self {
        Self {
            layout: SheetLayout::default(),
            sheet: None,
        }
    }

    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Read a named worksheet instead of the first one.
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn layout(&self) -> SheetLayout {
        self.layout
    }

    /// Read and split the spreadsheet at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(CountryTable, ValueTable), LoaderError> {
        let path = path.as_ref();
        let sheet = Self::read_raw_sheet(path, self.sheet.as_deref())?;
        let (countries, values) = Self::split_sheet(&sheet, &self.layout)?;
        info!(
            path = %path.display(),
            entities = countries.len(),
            columns = values.width(),
            numeric_columns = values.numeric_labels().len(),
            "loaded indicator table"
        );
        Ok((countries, values))
    }

    /// Read one worksheet into a typed grid anchored at A1.
    ///
    /// `sheet = None` selects the first worksheet. The workbook handle is
    /// dropped before returning.
    pub fn read_raw_sheet(path: &Path, sheet: Option<&str>) -> Result<RawSheet, LoaderError> {
        std::fs::metadata(path).map_err(|source| LoaderError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let spreadsheet_err = |message: String| LoaderError::Spreadsheet {
            path: path.to_path_buf(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;
        let sheet_names = workbook.sheet_names();
        debug!(path = %path.display(), sheets = ?sheet_names, "opened workbook");

        let name = match sheet {
            Some(name) => {
                if !sheet_names.iter().any(|s| s == name) {
                    return Err(spreadsheet_err(format!("no worksheet named '{}'", name)));
                }
                name.to_string()
            }
            None => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| spreadsheet_err("workbook contains no sheets".to_string()))?,
        };

        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| spreadsheet_err(e.to_string()))?;

        let sheet = Self::range_to_sheet(&range);
        debug!(
            sheet = %name,
            rows = sheet.height(),
            width = sheet.width(),
            "read worksheet"
        );
        Ok(sheet)
    }

    /// calamine ranges start at the first used cell; pad back to A1 so
    /// row and column indices match the sheet.
    fn range_to_sheet(range: &Range<Data>) -> RawSheet {
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<RawRow> = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells: RawRow = vec![None; col_offset];
            cells.extend(row.iter().map(Self::convert_cell));
            rows.push(cells);
        }
        RawSheet::new(rows)
    }

    fn convert_cell(cell: &Data) -> Option<RawCell> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::Float(f) => Some(RawCell::Number(*f)),
            Data::Int(i) => Some(RawCell::Number(*i as f64)),
            Data::Bool(b) => Some(RawCell::Bool(*b)),
            Data::String(s) => RawCell::text(s.clone()),
            Data::DateTime(dt) => Some(RawCell::Number(dt.as_f64())),
            Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::text(s.clone()),
        }
    }

    /// Split a raw sheet into the entity labels and the value table.
    pub fn split_sheet(
        sheet: &RawSheet,
        layout: &SheetLayout,
    ) -> Result<(CountryTable, ValueTable), LoaderError> {
        let header = sheet
            .row(layout.header_row)
            .ok_or(LoaderError::MissingHeaderRow {
                header_row: layout.header_row,
                rows: sheet.height(),
            })?;

        if sheet.width() < 2 {
            return Err(LoaderError::NoValueColumns {
                width: sheet.width(),
            });
        }

        let mut labels = Vec::with_capacity(sheet.width() - 1);
        let mut seen = HashSet::new();
        for (column, cell) in header.iter().enumerate().skip(1) {
            let label = cell
                .as_ref()
                .map(RawCell::label)
                .filter(|l| !l.is_empty())
                .ok_or(LoaderError::MissingColumnLabel {
                    column,
                    header_row: layout.header_row,
                })?;
            if !seen.insert(label.clone()) {
                return Err(LoaderError::DuplicateColumnLabel { label });
            }
            labels.push(label);
        }

        let data_rows = sheet.rows().get(layout.data_start()..).unwrap_or(&[]);

        let mut names = Vec::with_capacity(data_rows.len());
        for (offset, row) in data_rows.iter().enumerate() {
            let name = match &row[0] {
                None => None,
                Some(RawCell::Text(s)) => Some(s.trim().to_string()),
                Some(other) => {
                    return Err(LoaderError::NonTextEntityLabel {
                        row: layout.data_start() + offset,
                        value: other.label(),
                    })
                }
            };
            names.push(name);
        }

        let columns = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                let cells: Vec<Option<&RawCell>> =
                    data_rows.iter().map(|row| row[i + 1].as_ref()).collect();
                Self::build_column(label, &cells)
            })
            .collect();

        let countries = CountryTable::new(names)?;
        let values = ValueTable::new(columns)?;
        Ok((countries, values))
    }

    /// A column is numeric when every present cell is a number.
    fn build_column(label: String, cells: &[Option<&RawCell>]) -> TableColumn {
        let all_numeric = cells
            .iter()
            .flatten()
            .all(|cell| matches!(cell, RawCell::Number(_)));

        if all_numeric {
            TableColumn::Numeric {
                label,
                values: cells
                    .iter()
                    .map(|cell| cell.and_then(RawCell::as_number))
                    .collect(),
            }
        } else {
            TableColumn::Text {
                label,
                values: cells.iter().map(|cell| cell.map(RawCell::label)).collect(),
            }
        }
    }
}
