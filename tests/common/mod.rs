//! Shared fixtures: small World Bank style workbooks written to a temp dir.

#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};

/// A cell to write; `Empty` leaves the cell untouched.
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Empty,
}

pub fn write_rows(sheet: &mut Worksheet, first_row: u32, rows: &[Vec<Cell>]) -> Result<(), XlsxError> {
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (first_row + r as u32, c as u16);
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(r, c, *s)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n)?;
                }
                Cell::Empty => {}
            }
        }
    }
    Ok(())
}

/// Two metadata rows, a year header and three entities; C misses 2011.
pub fn indicator_rows() -> Vec<Vec<Cell>> {
    use Cell::*;
    vec![
        vec![Text("Data Source"), Text("World Development Indicators")],
        vec![Text("Last Updated Date"), Text("2024-06-28")],
        vec![Empty, Number(2010.0), Number(2011.0)],
        vec![Text("A"), Number(1.0), Number(2.0)],
        vec![Text("B"), Number(3.0), Number(4.0)],
        vec![Text("C"), Number(5.0), Empty],
    ]
}

/// Write `rows` starting at `first_row` into a one-sheet workbook.
pub fn write_workbook(dir: &Path, name: &str, first_row: u32, rows: &[Vec<Cell>]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Data").unwrap();
    write_rows(sheet, first_row, rows).unwrap();
    workbook.save(&path).unwrap();
    path
}

pub fn indicator_workbook(dir: &Path) -> PathBuf {
    write_workbook(dir, "indicators.xlsx", 0, &indicator_rows())
}
