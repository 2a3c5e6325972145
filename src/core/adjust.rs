//! Scaling a single price between two dates

use super::error::Result;
use super::resolver::resolve_index;
use super::series::InflationTable;
use chrono::NaiveDate;

/// Converts `original_price` observed on `original_date` into its equivalent
/// on `target_date`.
///
/// An absent price is passed through untouched without resolving anything.
pub fn adjust_price(
    original_date: NaiveDate,
    original_price: Option<f64>,
    target_date: NaiveDate,
    table: &InflationTable,
    growth_rate: f64,
) -> Result<Option<f64>> {
    let Some(price) = original_price else {
        return Ok(None);
    };

    let original_index = resolve_index(original_date, table, growth_rate)?;
    let target_index = resolve_index(target_date, table, growth_rate)?;

    if original_index == target_index {
        return Ok(Some(price));
    }
    Ok(Some(price * target_index / original_index))
}
