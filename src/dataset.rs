//! In-memory view of an uploaded CSV file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CopilotError, Result};

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Raw cells of a column, `None` when the header is absent.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.position(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// Numeric values of a column. Blank cells count as missing and are skipped.
    pub fn numeric_column(&self, name: &str) -> Result<Option<Vec<f64>>> {
        let Some(cells) = self.column(name) else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(cells.len());
        for (row, cell) in cells.iter().enumerate() {
            if let Some(value) = parse_cell(name, row, cell)? {
                values.push(value);
            }
        }

        Ok(Some(values))
    }

    /// Values of two columns paired by row. Rows where either cell is blank
    /// are dropped. `None` when either header is absent.
    pub fn numeric_pairs(&self, x: &str, y: &str) -> Result<Option<(Vec<f64>, Vec<f64>)>> {
        let (Some(x_cells), Some(y_cells)) = (self.column(x), self.column(y)) else {
            return Ok(None);
        };

        let mut xs = Vec::with_capacity(x_cells.len());
        let mut ys = Vec::with_capacity(y_cells.len());
        for (row, (x_cell, y_cell)) in x_cells.iter().zip(&y_cells).enumerate() {
            let x_value = parse_cell(x, row, x_cell)?;
            let y_value = parse_cell(y, row, y_cell)?;
            if let (Some(x_value), Some(y_value)) = (x_value, y_value) {
                xs.push(x_value);
                ys.push(y_value);
            }
        }

        Ok(Some((xs, ys)))
    }
}

/// Blank is `None`. Text, `inf` and `NaN` are rejected.
fn parse_cell(column: &str, row: usize, cell: &str) -> Result<Option<f64>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }

    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(CopilotError::NonNumeric {
            column: column.to_string(),
            row: row + 1,
            value: cell.to_string(),
        }),
    }
}
