//! Index time series and the tables built from them

use super::error::{AdjustError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::warn;

/// Consumer price index for all urban consumers, monthly.
pub const DEFAULT_SERIES_ID: &str = "CPIAUCSL";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub index: f64,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate, index: f64) -> Self {
        Self { date, index }
    }
}

/// A single cell of a tabular range, as read from a sheet or CSV file.
#[derive(Debug, Clone, PartialEq)]
pub enum TableCell {
    Empty,
    Date(NaiveDate),
    Number(f64),
    Text(String),
}

impl TableCell {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return TableCell::Empty;
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return TableCell::Date(date);
        }
        match raw.parse::<f64>() {
            Ok(number) => TableCell::Number(number),
            Err(_) => TableCell::Text(raw.to_string()),
        }
    }
}

impl Display for TableCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableCell::Empty => write!(f, "<empty>"),
            TableCell::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            TableCell::Number(n) => write!(f, "{n}"),
            TableCell::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// Index observations ordered by date.
///
/// The resolver assumes ascending, unique dates. Tables built from rows log a
/// warning when that does not hold but are otherwise accepted as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InflationTable {
    points: Vec<TimeSeriesPoint>,
}

impl InflationTable {
    pub fn new(points: Vec<TimeSeriesPoint>) -> Self {
        let table = Self { points };
        table.warn_if_unordered();
        table
    }

    /// Builds a table from a fixed-size two column range.
    ///
    /// Rows are read until the first sentinel row (one whose leading cell is
    /// empty); anything after it is ignored. Populated rows must hold a date
    /// followed by a number.
    pub fn from_rows<R: AsRef<[TableCell]>>(rows: &[R]) -> Result<Self> {
        let mut points = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            match row.first() {
                None | Some(TableCell::Empty) => break,
                Some(_) if row.len() < 2 => {
                    return Err(AdjustError::InvalidTable(format!(
                        "row {} has {} column(s), expected 2",
                        i + 1,
                        row.len()
                    )));
                }
                Some(_) => {}
            }

            let date = match &row[0] {
                TableCell::Date(date) => *date,
                other => {
                    return Err(AdjustError::InvalidTable(format!(
                        "row {}: expected a date, found {other}",
                        i + 1
                    )));
                }
            };
            let index = match &row[1] {
                TableCell::Number(index) => *index,
                other => {
                    return Err(AdjustError::InvalidTable(format!(
                        "row {}: expected an index value, found {other}",
                        i + 1
                    )));
                }
            };
            if !is_valid_index(index) {
                return Err(AdjustError::InvalidTable(format!(
                    "row {}: index must be positive, found {index}",
                    i + 1
                )));
            }
            points.push(TimeSeriesPoint { date, index });
        }

        Ok(Self::new(points))
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TimeSeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TimeSeriesPoint> {
        self.points.last()
    }

    fn warn_if_unordered(&self) {
        if let Some(pair) = self
            .points
            .windows(2)
            .find(|pair| pair[0].date >= pair[1].date)
        {
            warn!(
                "Inflation table dates are not strictly increasing: {} followed by {}",
                pair[0].date, pair[1].date
            );
        }
    }
}

/// Index values must be finite and positive.
pub fn is_valid_index(index: f64) -> bool {
    index.is_finite() && index > 0.0
}

/// Produces index tables, typically from a remote statistics service.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    async fn fetch_series(&self, series_id: &str) -> anyhow::Result<InflationTable>;

    /// Drops any cached copy so the next fetch goes to the source.
    async fn evict(&self, _series_id: &str) {}
}
