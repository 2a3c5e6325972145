//! Index tables and price ranges stored as local CSV files
//!
//! Files mirror a sheet range: the table has a date column followed by an
//! index column, optionally under a header row. A blank line or a row whose
//! first cell is blank (e.g. `,`) ends the table.

use crate::core::series::{InflationTable, SeriesProvider, TableCell};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::fs;
use std::iter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serves `<directory>/<series_id>.csv` files as series.
pub struct CsvTableProvider {
    directory: PathBuf,
}

impl CsvTableProvider {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SeriesProvider for CsvTableProvider {
    async fn fetch_series(&self, series_id: &str) -> Result<InflationTable> {
        let path = self.directory.join(format!("{series_id}.csv"));
        read_table(&path)
    }
}

/// Reads every record of a CSV file as cells. Rows may differ in length.
///
/// Blank lines are kept as single empty cells so they end a table the same
/// way a `,` row does.
pub fn read_cells(path: &Path) -> Result<Vec<Vec<TableCell>>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut rows = Vec::new();
    let mut chunk = String::new();
    let mut blank_lines = 0;
    for line in content.lines() {
        if line.trim().is_empty() {
            blank_lines += 1;
            continue;
        }
        // Trailing blank lines are dropped, only those followed by data count
        if blank_lines > 0 {
            parse_records(&chunk, path, &mut rows)?;
            chunk.clear();
            rows.extend(iter::repeat_n(vec![TableCell::Empty], blank_lines));
            blank_lines = 0;
        }
        chunk.push_str(line);
        chunk.push('\n');
    }
    parse_records(&chunk, path, &mut rows)?;

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

// The csv reader skips empty lines, so it only ever sees runs of populated ones
fn parse_records(chunk: &str, path: &Path, rows: &mut Vec<Vec<TableCell>>) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(chunk.as_bytes());

    for record in reader.records() {
        let record =
            record.with_context(|| format!("Failed to read CSV file: {}", path.display()))?;
        rows.push(record.iter().map(TableCell::parse).collect());
    }
    Ok(())
}

pub fn read_table(path: &Path) -> Result<InflationTable> {
    let mut rows = read_cells(path)?;
    if matches!(rows.first().and_then(|row| row.first()), Some(TableCell::Text(_))) {
        rows.remove(0);
    }

    InflationTable::from_rows(&rows)
        .with_context(|| format!("Failed to load inflation table: {}", path.display()))
}

/// Reads a range of prices. Blank cells are kept as absent values; anything
/// else that is not a number is rejected.
pub fn read_price_grid(path: &Path) -> Result<Vec<Vec<Option<f64>>>> {
    let rows = read_cells(path)?;
    let mut grid = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let mut prices = Vec::with_capacity(row.len());
        for (j, cell) in row.into_iter().enumerate() {
            match cell {
                TableCell::Empty => prices.push(None),
                TableCell::Number(price) => prices.push(Some(price)),
                other => bail!(
                    "Invalid price {other} at row {}, column {} of {}",
                    i + 1,
                    j + 1,
                    path.display()
                ),
            }
        }
        grid.push(prices);
    }
    Ok(grid)
}
