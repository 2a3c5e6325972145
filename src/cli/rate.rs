use super::ui;
use crate::core::rate::{ImpliedRate, implied_annual_rate};
use crate::core::{ConversionDefaults, InflationTable};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

#[derive(Debug, Clone, Default)]
pub struct RateOptions {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub growth_rate: Option<f64>,
}

pub fn run(
    options: &RateOptions,
    table: &InflationTable,
    defaults: &ConversionDefaults,
) -> Result<ImpliedRate> {
    let to = options.to.unwrap_or(defaults.today);
    let growth_rate = defaults.growth_rate_or_default(options.growth_rate);
    let rate = implied_annual_rate(options.from, to, table, growth_rate)?;

    let mut output = ui::new_styled_table();
    output.set_header(vec![
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Index (from)"),
        ui::header_cell("Index (to)"),
        ui::header_cell("Years"),
        ui::header_cell("Cumulative"),
        ui::header_cell("Annual"),
    ]);
    output.add_row(vec![
        Cell::new(options.from.format("%Y-%m-%d")),
        Cell::new(to.format("%Y-%m-%d")),
        ui::format_optional_cell(Some(rate.from_index), |v| format!("{v:.3}")),
        ui::format_optional_cell(Some(rate.to_index), |v| format!("{v:.3}")),
        ui::format_optional_cell(Some(rate.years), |v| format!("{v:.2}")),
        ui::change_cell(rate.cumulative_change),
        ui::change_cell(rate.annual_rate),
    ]);
    println!("{output}");

    Ok(rate)
}
