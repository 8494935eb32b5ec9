//! Statistics Calculator Module
//! Per-column descriptive statistics for the value table.

use crate::data::{TableColumn, ValueTable};
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

/// Statistic names for numeric columns, in display order.
pub const NUMERIC_STATS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Statistic names for text columns, in display order.
pub const CATEGORICAL_STATS: [&str; 4] = ["count", "unique", "top", "freq"];

/// Descriptive statistics for a numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for NumericSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            p50: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

impl NumericSummary {
    /// Values in [`NUMERIC_STATS`] order.
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.p25,
            self.p50,
            self.p75,
            self.max,
        ]
    }
}

/// Frequency statistics for a text column.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryKind {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub label: String,
    pub summary: SummaryKind,
}

impl ColumnSummary {
    pub fn numeric(&self) -> Option<&NumericSummary> {
        match &self.summary {
            SummaryKind::Numeric(s) => Some(s),
            SummaryKind::Categorical(_) => None,
        }
    }

    /// Formatted cell for a statistic row; `NaN` where it does not apply.
    fn cell(&self, stat: &str) -> String {
        match &self.summary {
            SummaryKind::Numeric(s) => match stat {
                "count" => s.count.to_string(),
                "mean" => format_stat(s.mean),
                "std" => format_stat(s.std),
                "min" => format_stat(s.min),
                "25%" => format_stat(s.p25),
                "50%" => format_stat(s.p50),
                "75%" => format_stat(s.p75),
                "max" => format_stat(s.max),
                _ => "NaN".to_string(),
            },
            SummaryKind::Categorical(s) => match stat {
                "count" => s.count.to_string(),
                "unique" => s.unique.to_string(),
                "top" => s.top.clone().unwrap_or_else(|| "NaN".to_string()),
                "freq" => s
                    .freq
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "NaN".to_string()),
                _ => "NaN".to_string(),
            },
        }
    }
}

/// Format a statistic roughly the way dataframe libraries print floats.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e6).contains(&magnitude) {
        format!("{:.6e}", value)
    } else {
        format!("{:.6}", value)
    }
}

/// Describe output for every column of a value table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DescribeTable {
    pub columns: Vec<ColumnSummary>,
}

impl DescribeTable {
    /// Statistic rows relevant to the columns present.
    pub fn row_names(&self) -> Vec<&'static str> {
        let has_numeric = self.columns.iter().any(|c| c.numeric().is_some());
        let has_text = self.columns.iter().any(|c| c.numeric().is_none());
        match (has_numeric, has_text) {
            (true, true) => vec![
                "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%",
                "max",
            ],
            (false, true) => CATEGORICAL_STATS.to_vec(),
            _ => NUMERIC_STATS.to_vec(),
        }
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &NumericSummary)> {
        self.columns
            .iter()
            .filter_map(|c| c.numeric().map(|s| (c.label.as_str(), s)))
    }

    pub fn get(&self, label: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.label == label)
    }
}

impl fmt::Display for DescribeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return writeln!(f, "Empty table: no columns");
        }

        let rows = self.row_names();
        let stub_width = rows.iter().map(|r| r.len()).max().unwrap_or(0);

        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| rows.iter().map(|r| c.cell(r)).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&cells)
            .map(|(c, col)| {
                col.iter()
                    .map(String::len)
                    .chain(std::iter::once(c.label.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:stub_width$}", "")?;
        for (c, w) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>w$}", c.label, w = *w)?;
        }
        writeln!(f)?;

        for (i, row) in rows.iter().enumerate() {
            write!(f, "{:<stub_width$}", row)?;
            for (col, w) in cells.iter().zip(&widths) {
                write!(f, "  {:>w$}", col[i], w = *w)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Describe every column of the table, numeric and text.
    pub fn describe(table: &ValueTable) -> DescribeTable {
        let columns: Vec<ColumnSummary> = table
            .columns()
            .into_par_iter()
            .map(|column| match column {
                TableColumn::Numeric { label, values } => {
                    let present: Vec<f64> = values.into_iter().flatten().collect();
                    ColumnSummary {
                        label,
                        summary: SummaryKind::Numeric(Self::compute_descriptive_stats(&present)),
                    }
                }
                TableColumn::Text { label, values } => ColumnSummary {
                    label,
                    summary: SummaryKind::Categorical(Self::compute_frequency_stats(&values)),
                },
            })
            .collect();

        let numeric = columns.iter().filter(|c| c.numeric().is_some()).count();
        if numeric == 0 {
            warn!("value table has no numeric columns");
        }
        info!(
            columns = columns.len(),
            numeric_columns = numeric,
            "computed summary statistics"
        );

        DescribeTable { columns }
    }

    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> NumericSummary {
        let n = values.len();
        if n == 0 {
            return NumericSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        NumericSummary {
            count: n,
            mean: statistics::Statistics::mean(values),
            // Sample standard deviation; NaN below two values
            std: statistics::Statistics::std_dev(values),
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            p50: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Count, distinct values and the most frequent value of a text column.
    ///
    /// Ties for most frequent go to the value seen first.
    pub fn compute_frequency_stats(values: &[Option<String>]) -> CategoricalSummary {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut count = 0;
        for (i, value) in values.iter().enumerate() {
            if let Some(v) = value {
                count += 1;
                counts.entry(v.as_str()).or_insert((0, i)).0 += 1;
            }
        }

        let top = counts
            .iter()
            .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
            .map(|(value, (freq, _))| (value.to_string(), *freq));

        CategoricalSummary {
            count,
            unique: counts.len(),
            freq: top.as_ref().map(|(_, f)| *f),
            top: top.map(|(v, _)| v),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn numeric_summary_matches_known_values() {
        let s = StatsCalculator::compute_descriptive_stats(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.count, 4);
        assert!(approx(s.mean, 2.5));
        assert!(approx(s.std, (5.0f64 / 3.0).sqrt()));
        assert!(approx(s.min, 1.0));
        assert!(approx(s.p25, 1.75));
        assert!(approx(s.p50, 2.5));
        assert!(approx(s.p75, 3.25));
        assert!(approx(s.max, 4.0));
    }

    #[test]
    fn single_value_has_nan_std() {
        let s = StatsCalculator::compute_descriptive_stats(&[7.0]);
        assert_eq!(s.count, 1);
        assert!(approx(s.mean, 7.0));
        assert!(s.std.is_nan());
        assert!(approx(s.p50, 7.0));
    }

    #[test]
    fn empty_column_is_all_nan() {
        let s = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(s.count, 0);
        assert!(s.values()[1..].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn frequency_stats_pick_first_on_ties() {
        let values = vec![
            Some("b".to_string()),
            None,
            Some("a".to_string()),
            Some("a".to_string()),
            Some("b".to_string()),
        ];
        let s = StatsCalculator::compute_frequency_stats(&values);
        assert_eq!(s.count, 4);
        assert_eq!(s.unique, 2);
        assert_eq!(s.top.as_deref(), Some("b"));
        assert_eq!(s.freq, Some(2));

        let empty = StatsCalculator::compute_frequency_stats(&[None, None]);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.top, None);
        assert_eq!(empty.freq, None);
    }

    #[test]
    fn describe_keeps_column_order_and_kinds() {
        let table = ValueTable::new(vec![
            TableColumn::Text {
                label: "code".into(),
                values: vec![Some("X".into()), Some("Y".into()), Some("X".into())],
            },
            TableColumn::Numeric {
                label: "2010".into(),
                values: vec![Some(1.0), Some(3.0), None],
            },
        ])
        .unwrap();

        let described = StatsCalculator::describe(&table);
        let labels: Vec<&str> = described.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["code", "2010"]);
        assert_eq!(described.row_names().len(), 11);

        let numeric = described.get("2010").and_then(ColumnSummary::numeric).unwrap();
        assert_eq!(numeric.count, 2);
        assert!(approx(numeric.mean, 2.0));

        let rendered = described.to_string();
        assert!(rendered.contains("unique"));
        assert!(rendered.contains("2.000000"));
    }

    #[test]
    fn numeric_only_table_uses_eight_rows() {
        let table = ValueTable::new(vec![TableColumn::Numeric {
            label: "2010".into(),
            values: vec![Some(1.0)],
        }])
        .unwrap();
        assert_eq!(StatsCalculator::describe(&table).row_names(), NUMERIC_STATS.to_vec());
    }

    #[test]
    fn format_stat_switches_to_scientific() {
        assert_eq!(format_stat(f64::NAN), "NaN");
        assert_eq!(format_stat(2.5), "2.500000");
        assert_eq!(format_stat(0.0), "0.000000");
        assert_eq!(format_stat(12_345_678.0), "1.234568e7");
    }
}
