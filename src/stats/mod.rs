//! Stats module - Statistical calculations

mod calculator;
mod correlation;

pub use calculator::{
    format_stat, CategoricalSummary, ColumnSummary, DescribeTable, NumericSummary,
    StatsCalculator, SummaryKind, CATEGORICAL_STATS, NUMERIC_STATS,
};
pub use correlation::{CorrelationCalculator, CorrelationMatrix};
