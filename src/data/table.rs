//! Table Model Module
//! Typed raw sheet grid plus the two tables derived from it.

use polars::prelude::*;
use std::fmt;

/// Name of the single column held by [`CountryTable`].
pub const COUNTRY_COLUMN: &str = "Country Name";

/// Text values read as missing, compared after trimming.
const MISSING_MARKERS: [&str; 12] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "#N/A", "#NA", "NULL", "null", "<NA>", "None",
];

/// A non-empty spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl RawCell {
    /// Build a text cell, mapping missing-value markers to `None`.
    pub fn text(value: impl Into<String>) -> Option<RawCell> {
        let value = value.into();
        if MISSING_MARKERS.contains(&value.trim()) {
            None
        } else {
            Some(RawCell::Text(value))
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawCell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render as a column label or text value.
    pub fn label(&self) -> String {
        match self {
            RawCell::Number(n) => format_number(*n),
            RawCell::Text(s) => s.trim().to_string(),
            RawCell::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Print integral floats without a fractional part (`2010.0` -> `2010`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One spreadsheet row; `None` marks a missing cell.
pub type RawRow = Vec<Option<RawCell>>;

/// Rectangular cell grid anchored at A1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    rows: Vec<RawRow>,
    width: usize,
}

impl RawSheet {
    /// Build a sheet, padding short rows with missing cells.
    pub fn new(mut rows: Vec<RawRow>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, None);
        }
        Self { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&RawRow> {
        self.rows.get(index)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&RawCell> {
        self.rows.get(row)?.get(col)?.as_ref()
    }
}

/// Where the header and data live inside a [`RawSheet`].
///
/// The entity label is always column 0; values start at column 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    /// 0-based row holding the column (year) labels.
    pub header_row: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self { header_row: 2 }
    }
}

impl SheetLayout {
    pub fn data_start(&self) -> usize {
        self.header_row + 1
    }
}

/// Check whether a polars dtype is a numeric type.
pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn column_as_f64(column: &Column) -> Option<Vec<Option<f64>>> {
    if !is_numeric_dtype(column.dtype()) {
        return None;
    }
    let cast = column.cast(&DataType::Float64).ok()?;
    let ca = cast.f64().ok()?;
    Some(ca.into_iter().collect())
}

fn column_as_text(column: &Column) -> Option<Vec<Option<String>>> {
    let cast = column.cast(&DataType::String).ok()?;
    let ca = cast.str().ok()?;
    Some(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Entity labels, one per data row, in sheet order.
#[derive(Debug, Clone)]
pub struct CountryTable {
    df: DataFrame,
}

impl CountryTable {
    pub fn new(names: Vec<Option<String>>) -> PolarsResult<Self> {
        let df = DataFrame::new(vec![Column::new(COUNTRY_COLUMN.into(), names)])?;
        Ok(Self { df })
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn names(&self) -> Vec<Option<String>> {
        self.df
            .column(COUNTRY_COLUMN)
            .ok()
            .and_then(column_as_text)
            .unwrap_or_default()
    }

    pub fn get_dataframe(&self) -> &DataFrame {
        &self.df
    }
}

/// A value column pulled out of a [`ValueTable`].
#[derive(Debug, Clone, PartialEq)]
pub enum TableColumn {
    Numeric {
        label: String,
        values: Vec<Option<f64>>,
    },
    Text {
        label: String,
        values: Vec<Option<String>>,
    },
}

impl TableColumn {
    pub fn label(&self) -> &str {
        match self {
            TableColumn::Numeric { label, .. } | TableColumn::Text { label, .. } => label,
        }
    }
}

/// Year-labelled indicator values; rows line up with [`CountryTable`].
#[derive(Debug, Clone)]
pub struct ValueTable {
    df: DataFrame,
}

impl ValueTable {
    pub fn new(columns: Vec<TableColumn>) -> PolarsResult<Self> {
        let columns = columns
            .into_iter()
            .map(|col| match col {
                TableColumn::Numeric { label, values } => Column::new(label.into(), values),
                TableColumn::Text { label, values } => Column::new(label.into(), values),
            })
            .collect();
        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn column_labels(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Labels of the numeric columns, in column order.
    pub fn numeric_labels(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| is_numeric_dtype(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    pub fn numeric_column(&self, label: &str) -> Option<Vec<Option<f64>>> {
        self.df.column(label).ok().and_then(column_as_f64)
    }

    pub fn text_column(&self, label: &str) -> Option<Vec<Option<String>>> {
        let column = self.df.column(label).ok()?;
        if is_numeric_dtype(column.dtype()) {
            return None;
        }
        column_as_text(column)
    }

    /// All columns as typed vectors, in column order.
    pub fn columns(&self) -> Vec<TableColumn> {
        self.df
            .get_columns()
            .iter()
            .filter_map(|col| {
                let label = col.name().to_string();
                if is_numeric_dtype(col.dtype()) {
                    column_as_f64(col).map(|values| TableColumn::Numeric { label, values })
                } else {
                    column_as_text(col).map(|values| TableColumn::Text { label, values })
                }
            })
            .collect()
    }

    /// Numeric columns only, as `(label, values)` pairs.
    pub fn numeric_columns(&self) -> Vec<(String, Vec<Option<f64>>)> {
        self.columns()
            .into_iter()
            .filter_map(|col| match col {
                TableColumn::Numeric { label, values } => Some((label, values)),
                TableColumn::Text { .. } => None,
            })
            .collect()
    }

    /// Re-attach the entity labels as the leading column.
    pub fn with_countries(&self, countries: &CountryTable) -> PolarsResult<DataFrame> {
        if countries.len() != self.height() {
            return Err(PolarsError::ShapeMismatch(
                format!(
                    "{} country rows vs {} value rows",
                    countries.len(),
                    self.height()
                )
                .into(),
            ));
        }
        countries.get_dataframe().hstack(self.df.get_columns())
    }

    pub fn get_dataframe(&self) -> &DataFrame {
        &self.df
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_markers_become_none() {
        assert_eq!(RawCell::text("  "), None);
        assert_eq!(RawCell::text("#N/A"), None);
        assert_eq!(RawCell::text("Aruba"), Some(RawCell::Text("Aruba".into())));
    }

    #[test]
    fn integral_numbers_label_without_fraction() {
        assert_eq!(RawCell::Number(2010.0).label(), "2010");
        assert_eq!(RawCell::Number(2.5).label(), "2.5");
        assert_eq!(RawCell::Text(" 1990 ".into()).label(), "1990");
    }

    #[test]
    fn raw_sheet_pads_ragged_rows() {
        let sheet = RawSheet::new(vec![
            vec![Some(RawCell::Number(1.0))],
            vec![None, None, Some(RawCell::Bool(true))],
        ]);
        assert_eq!(sheet.width(), 3);
        assert_eq!(sheet.row(0).map(Vec::len), Some(3));
        assert_eq!(sheet.get(1, 2), Some(&RawCell::Bool(true)));
        assert_eq!(sheet.get(0, 2), None);
    }

    #[test]
    fn value_table_separates_numeric_and_text() {
        let table = ValueTable::new(vec![
            TableColumn::Text {
                label: "Country Code".into(),
                values: vec![Some("ABW".into()), None],
            },
            TableColumn::Numeric {
                label: "1990".into(),
                values: vec![Some(1.0), None],
            },
        ])
        .unwrap();

        assert_eq!(table.numeric_labels(), vec!["1990".to_string()]);
        assert_eq!(table.numeric_column("1990"), Some(vec![Some(1.0), None]));
        assert_eq!(table.numeric_column("Country Code"), None);
        assert_eq!(
            table.text_column("Country Code"),
            Some(vec![Some("ABW".to_string()), None])
        );
    }

    #[test]
    fn with_countries_prepends_label_column() {
        let countries = CountryTable::new(vec![Some("A".into()), Some("B".into())]).unwrap();
        let values = ValueTable::new(vec![TableColumn::Numeric {
            label: "2010".into(),
            values: vec![Some(1.0), Some(2.0)],
        }])
        .unwrap();

        let joined = values.with_countries(&countries).unwrap();
        let names: Vec<String> = joined
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec![COUNTRY_COLUMN.to_string(), "2010".to_string()]);
    }

    #[test]
    fn with_countries_rejects_mismatched_lengths() {
        let countries = CountryTable::new(vec![Some("A".into())]).unwrap();
        let values = ValueTable::new(vec![TableColumn::Numeric {
            label: "2010".into(),
            values: vec![Some(1.0), Some(2.0)],
        }])
        .unwrap();
        assert!(values.with_countries(&countries).is_err());
    }
}
