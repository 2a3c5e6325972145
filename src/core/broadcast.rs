//! Shape-broadcasting evaluation of price conversions
//!
//! Arguments arrive as scalars, sequences (one column of a range) or grids
//! (rows of a range). The evaluator pairs them up, converts each cell with
//! [`adjust_price`] and returns a result shaped like the non-scalar input.
//!
//! Ranges are usually larger than the data they hold, so every scan stops at
//! the first absent cell. Positions from the sentinel onwards are never
//! computed and come back as `None`.

use super::adjust::adjust_price;
use super::error::{AdjustError, Result};
use super::series::InflationTable;
use chrono::NaiveDate;

pub const DEFAULT_GROWTH_RATE: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub enum DateArg {
    Scalar(NaiveDate),
    Sequence(Vec<Option<NaiveDate>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PriceArg {
    Scalar(Option<f64>),
    Sequence(Vec<Option<f64>>),
    Grid(Vec<Vec<Option<f64>>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    Scalar(Option<f64>),
    Sequence(Vec<Option<f64>>),
    Grid(Vec<Vec<Option<f64>>>),
}

/// Values the caller fills in for omitted arguments before evaluating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionDefaults {
    pub today: NaiveDate,
    pub growth_rate: f64,
}

impl ConversionDefaults {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            growth_rate: DEFAULT_GROWTH_RATE,
        }
    }

    pub fn with_growth_rate(mut self, growth_rate: f64) -> Self {
        self.growth_rate = growth_rate;
        self
    }

    pub fn date_or_today(&self, date: Option<DateArg>) -> DateArg {
        date.unwrap_or(DateArg::Scalar(self.today))
    }

    pub fn growth_rate_or_default(&self, growth_rate: Option<f64>) -> f64 {
        growth_rate.unwrap_or(self.growth_rate)
    }
}

/// Converts prices from `original_date` to `target_date`, broadcasting over
/// whichever argument is a range.
///
/// When `original_date` is a sequence each of its entries is paired with the
/// matching price row (or the single scalar price), and likewise for
/// `target_date`. Both dates being sequences is rejected. With scalar dates,
/// every price of a sequence or grid is converted between the same two dates.
///
/// Evaluation fails on the first cell that cannot be converted; no partial
/// result is returned.
pub fn evaluate(
    original_date: &DateArg,
    original_price: &PriceArg,
    target_date: &DateArg,
    table: &InflationTable,
    growth_rate: f64,
) -> Result<Evaluated> {
    if let PriceArg::Scalar(None) = original_price {
        return Ok(Evaluated::Scalar(None));
    }

    if let (DateArg::Sequence(_), DateArg::Sequence(_)) = (original_date, target_date) {
        return Err(AdjustError::InvalidInput(
            "original and target dates cannot both be ranges".to_string(),
        ));
    }

    if growth_rate.is_nan() || growth_rate < -1.0 {
        return Err(AdjustError::InvalidGrowthRate(growth_rate));
    }

    match (original_date, target_date) {
        (DateArg::Sequence(dates), DateArg::Scalar(target)) => {
            broadcast_over_dates(dates, original_price, |date, price| {
                adjust_price(date, price, *target, table, growth_rate)
            })
        }
        (DateArg::Scalar(original), DateArg::Sequence(dates)) => {
            broadcast_over_dates(dates, original_price, |date, price| {
                adjust_price(*original, price, date, table, growth_rate)
            })
        }
        (DateArg::Scalar(original), DateArg::Scalar(target)) => {
            broadcast_over_prices(original_price, |price| {
                adjust_price(*original, price, *target, table, growth_rate)
            })
        }
        (DateArg::Sequence(_), DateArg::Sequence(_)) => unreachable!("rejected above"),
    }
}

/// Pairs row `i` of `prices` with `dates[i]`. A sequence of prices is treated
/// as a grid of single-cell rows.
fn broadcast_over_dates<F>(
    dates: &[Option<NaiveDate>],
    prices: &PriceArg,
    mut convert: F,
) -> Result<Evaluated>
where
    F: FnMut(NaiveDate, Option<f64>) -> Result<Option<f64>>,
{
    match prices {
        PriceArg::Grid(rows) => {
            let mut out: Vec<Vec<Option<f64>>> =
                rows.iter().map(|row| vec![None; row.len()]).collect();

            for (i, (date, row)) in dates.iter().zip(rows).enumerate() {
                let Some(date) = *date else { break };
                for (j, price) in row.iter().enumerate() {
                    if price.is_none() {
                        break;
                    }
                    out[i][j] = convert(date, *price)?;
                }
            }
            Ok(Evaluated::Grid(out))
        }
        PriceArg::Sequence(column) => {
            let mut out = vec![None; dates.len()];
            for (i, date) in dates.iter().enumerate() {
                let Some(date) = *date else { break };
                if let Some(price) = column.get(i).copied().flatten() {
                    out[i] = convert(date, Some(price))?;
                }
            }
            Ok(Evaluated::Sequence(out))
        }
        PriceArg::Scalar(price) => {
            let mut out = vec![None; dates.len()];
            for (i, date) in dates.iter().enumerate() {
                let Some(date) = *date else { break };
                out[i] = convert(date, *price)?;
            }
            Ok(Evaluated::Sequence(out))
        }
    }
}

/// Converts every price between the same pair of dates.
fn broadcast_over_prices<F>(prices: &PriceArg, mut convert: F) -> Result<Evaluated>
where
    F: FnMut(Option<f64>) -> Result<Option<f64>>,
{
    match prices {
        PriceArg::Scalar(price) => Ok(Evaluated::Scalar(convert(*price)?)),
        PriceArg::Sequence(column) => {
            let mut out = vec![None; column.len()];
            for (i, price) in column.iter().enumerate() {
                if price.is_none() {
                    break;
                }
                out[i] = convert(*price)?;
            }
            Ok(Evaluated::Sequence(out))
        }
        PriceArg::Grid(rows) => {
            let mut out: Vec<Vec<Option<f64>>> =
                rows.iter().map(|row| vec![None; row.len()]).collect();

            for (i, row) in rows.iter().enumerate() {
                // A row without a leading value marks the end of the range
                if row.first().copied().flatten().is_none() {
                    break;
                }
                for (j, price) in row.iter().enumerate() {
                    if price.is_none() {
                        break;
                    }
                    out[i][j] = convert(*price)?;
                }
            }
            Ok(Evaluated::Grid(out))
        }
    }
}
