//! Data Processor Module
//! Reshaping and export of the loaded tables.

use crate::data::table::{CountryTable, ValueTable};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{countries} country rows do not match {values} value rows")]
    RowMismatch { countries: usize, values: usize },
}

/// Indicator values with years as the row axis: one series per entity.
#[derive(Debug, Clone, PartialEq)]
pub struct YearTable {
    /// Year labels, in the value table's column order.
    pub years: Vec<String>,
    /// Entity names, in sheet order.
    pub entities: Vec<String>,
    /// `series[e][y]` is entity `e` in year `y`.
    pub series: Vec<Vec<Option<f64>>>,
}

impl YearTable {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() || self.entities.is_empty()
    }
}

/// Handles reshaping and export of loaded tables.
pub struct DataProcessor;

impl DataProcessor {
    /// Transpose the numeric columns so years become the row axis.
    ///
    /// Text columns are dropped. Entities without a name are called
    /// `row <i>` after their position.
    pub fn transpose_years(
        values: &ValueTable,
        countries: &CountryTable,
    ) -> Result<YearTable, ProcessorError> {
        if countries.len() != values.height() {
            return Err(ProcessorError::RowMismatch {
                countries: countries.len(),
                values: values.height(),
            });
        }

        let columns = values.numeric_columns();
        let years: Vec<String> = columns.iter().map(|(label, _)| label.clone()).collect();

        let entities: Vec<String> = countries
            .names()
            .into_iter()
            .enumerate()
            .map(|(i, name)| name.unwrap_or_else(|| format!("row {}", i)))
            .collect();

        let series = (0..values.height())
            .map(|row| columns.iter().map(|(_, col)| col[row]).collect())
            .collect();

        Ok(YearTable {
            years,
            entities,
            series,
        })
    }

    /// Write the value table to CSV with the entity labels as the first column.
    pub fn export_csv(
        values: &ValueTable,
        countries: &CountryTable,
        path: &Path,
    ) -> Result<(), ProcessorError> {
        let mut df = values.with_countries(countries)?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        info!(path = %path.display(), rows = df.height(), "wrote csv");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::TableColumn;
    use pretty_assertions::assert_eq;

    fn tables() -> (CountryTable, ValueTable) {
        let countries =
            CountryTable::new(vec![Some("A".into()), None, Some("C".into())]).unwrap();
        let values = ValueTable::new(vec![
            TableColumn::Text {
                label: "Country Code".into(),
                values: vec![Some("AAA".into()), Some("BBB".into()), Some("CCC".into())],
            },
            TableColumn::Numeric {
                label: "2010".into(),
                values: vec![Some(1.0), Some(3.0), Some(5.0)],
            },
            TableColumn::Numeric {
                label: "2011".into(),
                values: vec![Some(2.0), Some(4.0), None],
            },
        ])
        .unwrap();
        (countries, values)
    }

    #[test]
    fn transpose_puts_years_on_rows() {
        let (countries, values) = tables();
        let years = DataProcessor::transpose_years(&values, &countries).unwrap();

        assert_eq!(years.years, vec!["2010".to_string(), "2011".to_string()]);
        assert_eq!(
            years.entities,
            vec!["A".to_string(), "row 1".to_string(), "C".to_string()]
        );
        assert_eq!(
            years.series,
            vec![
                vec![Some(1.0), Some(2.0)],
                vec![Some(3.0), Some(4.0)],
                vec![Some(5.0), None],
            ]
        );
    }

    #[test]
    fn transpose_rejects_misaligned_tables() {
        let (_, values) = tables();
        let countries = CountryTable::new(vec![Some("A".into())]).unwrap();
        assert!(matches!(
            DataProcessor::transpose_years(&values, &countries),
            Err(ProcessorError::RowMismatch {
                countries: 1,
                values: 3
            })
        ));
    }

    #[test]
    fn export_csv_writes_country_column_first() {
        let (countries, values) = tables();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.csv");

        DataProcessor::export_csv(&values, &countries, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let header = written.lines().next().unwrap();
        assert_eq!(header, "Country Name,Country Code,2010,2011");
        assert_eq!(written.lines().count(), 4);
    }
}
