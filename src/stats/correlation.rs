//! Pairwise Pearson correlation between numeric indicator columns.

use crate::data::ValueTable;
use crate::stats::calculator::format_stat;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Symmetric correlation matrix over the numeric columns of a table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `labels.len()` squared.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied()
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| {
            (0..n).all(|j| {
                let (a, b) = (self.values[i][j], self.values[j][i]);
                a == b || (a.is_nan() && b.is_nan())
            })
        })
    }
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "Empty correlation matrix: no numeric columns");
        }

        let stub_width = self.labels.iter().map(String::len).max().unwrap_or(0);
        let cells: Vec<Vec<String>> = self
            .values
            .iter()
            .map(|row| row.iter().map(|v| format_stat(*v)).collect())
            .collect();
        let widths: Vec<usize> = (0..self.len())
            .map(|j| {
                cells
                    .iter()
                    .map(|row| row[j].len())
                    .chain(std::iter::once(self.labels[j].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:stub_width$}", "")?;
        for (label, w) in self.labels.iter().zip(&widths) {
            write!(f, "  {:>w$}", label, w = *w)?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&cells) {
            write!(f, "{:<stub_width$}", label)?;
            for (cell, w) in row.iter().zip(&widths) {
                write!(f, "  {:>w$}", cell, w = *w)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Correlation calculations, row-parallel.
pub struct CorrelationCalculator;

impl CorrelationCalculator {
    /// Pearson correlation of every pair of numeric columns.
    ///
    /// Only rows where both columns are present take part in a pair.
    /// Pairs with fewer than two shared rows or zero variance are NaN.
    pub fn correlation(table: &ValueTable) -> CorrelationMatrix {
        let columns = table.numeric_columns();
        let n = columns.len();
        let labels: Vec<String> = columns.iter().map(|(label, _)| label.clone()).collect();

        let upper: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (i..n)
                    .map(|j| {
                        let r = Self::pearson(&columns[i].1, &columns[j].1);
                        if i == j && !r.is_nan() {
                            1.0
                        } else {
                            r
                        }
                    })
                    .collect()
            })
            .collect();

        let mut values = vec![vec![f64::NAN; n]; n];
        for (i, row) in upper.iter().enumerate() {
            for (offset, r) in row.iter().enumerate() {
                let j = i + offset;
                values[i][j] = *r;
                values[j][i] = *r;
            }
        }

        info!(columns = n, "computed correlation matrix");
        CorrelationMatrix { labels, values }
    }

    /// Pearson coefficient over pairwise-complete observations.
    pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
        let pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .filter(|(a, b)| !a.is_nan() && !b.is_nan())
            .collect();

        let count = pairs.len();
        if count < 2 {
            return f64::NAN;
        }
        // Rounding in the mean leaves a tiny variance for constant input
        let (x0, y0) = pairs[0];
        if pairs.iter().all(|(a, _)| *a == x0) || pairs.iter().all(|(_, b)| *b == y0) {
            return f64::NAN;
        }

        let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / count as f64;
        let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / count as f64;

        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (a, b) in &pairs {
            let dx = a - mean_x;
            let dy = b - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return f64::NAN;
        }
        (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TableColumn;
    use pretty_assertions::assert_eq;

    fn numeric(label: &str, values: &[Option<f64>]) -> TableColumn {
        TableColumn::Numeric {
            label: label.to_string(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn perfect_positive_and_negative() {
        let x = [Some(1.0), Some(2.0), Some(3.0)];
        let up = [Some(2.0), Some(4.0), Some(6.0)];
        let down = [Some(3.0), Some(2.0), Some(1.0)];
        assert!((CorrelationCalculator::pearson(&x, &up) - 1.0).abs() < 1e-12);
        assert!((CorrelationCalculator::pearson(&x, &down) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_values_are_excluded_pairwise() {
        let x = [Some(1.0), Some(2.0), None, Some(4.0)];
        let y = [Some(1.0), Some(2.0), Some(100.0), Some(4.0)];
        assert!((CorrelationCalculator::pearson(&x, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn too_few_shared_points_is_nan() {
        let x = [Some(1.0), None, Some(3.0)];
        let y = [None, Some(2.0), Some(3.0)];
        assert!(CorrelationCalculator::pearson(&x, &y).is_nan());
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let table = ValueTable::new(vec![
            numeric("2010", &[Some(1.0), Some(3.0), Some(5.0)]),
            numeric("2011", &[Some(2.0), Some(4.0), None]),
            numeric("2012", &[Some(9.0), Some(1.0), Some(4.0)]),
            TableColumn::Text {
                label: "code".into(),
                values: vec![None, None, None],
            },
        ])
        .unwrap();

        let matrix = CorrelationCalculator::correlation(&table);
        assert_eq!(matrix.labels, vec!["2010", "2011", "2012"]);
        assert!(matrix.is_symmetric());
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), Some(1.0));
        }
        for row in &matrix.values {
            for v in row.iter().filter(|v| !v.is_nan()) {
                assert!((-1.0..=1.0).contains(v));
            }
        }
        // Two shared rows, both rising
        assert_eq!(matrix.get(0, 1), Some(1.0));
    }

    #[test]
    fn constant_column_gives_nan_self_correlation() {
        let table =
            ValueTable::new(vec![numeric("2010", &[Some(4.0), Some(4.0), Some(4.0)])]).unwrap();
        let matrix = CorrelationCalculator::correlation(&table);
        assert_eq!(matrix.len(), 1);
        assert!(matrix.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn inexact_constant_column_is_nan_against_everything() {
        let table = ValueTable::new(vec![
            numeric("2010", &[Some(0.1); 3]),
            numeric("2011", &[Some(1.0), Some(2.0), Some(4.0)]),
        ])
        .unwrap();
        let matrix = CorrelationCalculator::correlation(&table);
        assert!(matrix.get(0, 0).unwrap().is_nan());
        assert!(matrix.get(0, 1).unwrap().is_nan());
        assert!(matrix.get(1, 0).unwrap().is_nan());
        assert_eq!(matrix.get(1, 1), Some(1.0));
    }

    #[test]
    fn constant_over_shared_rows_is_nan() {
        // 2.7 repeats wherever y is present; the differing row is unpaired
        let x = [Some(2.7), Some(2.7), Some(9.0), Some(2.7)];
        let y = [Some(1.0), Some(3.0), None, Some(2.0)];
        assert!(CorrelationCalculator::pearson(&x, &y).is_nan());
        assert!(CorrelationCalculator::pearson(&y, &x).is_nan());
    }

    #[test]
    fn no_numeric_columns_gives_empty_matrix() {
        let table = ValueTable::new(vec![TableColumn::Text {
            label: "code".into(),
            values: vec![Some("A".into())],
        }])
        .unwrap();
        let matrix = CorrelationCalculator::correlation(&table);
        assert!(matrix.is_empty());
        assert!(matrix.to_string().contains("no numeric columns"));
    }
}
