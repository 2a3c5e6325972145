//! Index resolution for arbitrary dates against a sparse table

use super::error::{AdjustError, Result};
use super::series::{InflationTable, TimeSeriesPoint};
use chrono::NaiveDate;

pub const DAYS_PER_YEAR: f64 = 365.25;

/// Returns the index value for `date`.
///
/// Dates inside the table are linearly interpolated between the surrounding
/// rows. Dates outside it are extrapolated from the nearest row by compounding
/// `growth_rate` per year; the rate is ignored otherwise.
pub fn resolve_index(date: NaiveDate, table: &InflationTable, growth_rate: f64) -> Result<f64> {
    if table.is_empty() {
        return Err(AdjustError::InvalidTable(
            "the table has no populated rows".to_string(),
        ));
    }

    let (previous, next) = neighbours(date, table.points());

    match (previous, next) {
        (Some(prev), _) if prev.date == date => Ok(prev.index),
        (Some(prev), Some(next)) => {
            let elapsed = (date - prev.date).num_days() as f64;
            let span = (next.date - prev.date).num_days() as f64;
            Ok(prev.index + (next.index - prev.index) * elapsed / span)
        }
        (Some(prev), None) => {
            let days = (date - prev.date).num_days() as f64;
            Ok(prev.index * growth_factor(growth_rate, days))
        }
        (None, Some(next)) => {
            let days = (next.date - date).num_days() as f64;
            Ok(next.index / growth_factor(growth_rate, days))
        }
        (None, None) => Err(AdjustError::InvalidRange { date }),
    }
}

/// Finds the last row on or before `date` and the row that follows it.
fn neighbours(
    date: NaiveDate,
    points: &[TimeSeriesPoint],
) -> (Option<&TimeSeriesPoint>, Option<&TimeSeriesPoint>) {
    let mut previous = None;
    let mut next = points.first();

    for (i, point) in points.iter().enumerate() {
        if point.date > date {
            break;
        }
        previous = Some(point);
        next = points.get(i + 1);
    }

    (previous, next)
}

fn growth_factor(growth_rate: f64, days: f64) -> f64 {
    (1.0 + growth_rate).powf(days / DAYS_PER_YEAR)
}
