//! Data module - spreadsheet loading and reshaping

mod loader;
mod processor;
mod table;

pub use loader::{LoaderError, TableLoader};
pub use processor::{DataProcessor, ProcessorError, YearTable};
pub use table::{
    format_number, CountryTable, RawCell, RawRow, RawSheet, SheetLayout, TableColumn, ValueTable,
    COUNTRY_COLUMN,
};
