//! Implied inflation between two dates

use super::resolver::{DAYS_PER_YEAR, resolve_index};
use super::series::InflationTable;
use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ImpliedRate {
    pub from_index: f64,
    pub to_index: f64,
    pub years: f64,
    /// Total change in percent.
    pub cumulative_change: f64,
    /// Compound annual rate in percent.
    pub annual_rate: f64,
}

pub fn implied_annual_rate(
    from: NaiveDate,
    to: NaiveDate,
    table: &InflationTable,
    growth_rate: f64,
) -> Result<ImpliedRate> {
    if from >= to {
        bail!("Start date {from} must be before end date {to}");
    }

    let from_index = resolve_index(from, table, growth_rate)?;
    let to_index = resolve_index(to, table, growth_rate)?;
    if from_index <= 0.0 || to_index <= 0.0 {
        bail!("Index values must be positive, got {from_index} and {to_index}");
    }

    let years = (to - from).num_days() as f64 / DAYS_PER_YEAR;
    debug!("Implied rate between {from_index} and {to_index} over {years:.4}yrs");

    let begin_bal = Decimal::from_f64(from_index).ok_or_else(|| anyhow!("Invalid start index"))?;
    let end_bal = Decimal::from_f64(to_index).ok_or_else(|| anyhow!("Invalid end index"))?;
    let n_years = Decimal::from_f64(years).ok_or_else(|| anyhow!("Invalid duration"))?;

    let rate = cagr(begin_bal, end_bal, n_years);
    let annual_rate = (rate * Decimal::from(100))
        .to_f64()
        .ok_or_else(|| anyhow!("Annual rate conversion failed"))?;

    Ok(ImpliedRate {
        from_index,
        to_index,
        years,
        cumulative_change: (to_index / from_index - 1.0) * 100.0,
        annual_rate,
    })
}
