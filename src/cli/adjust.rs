use super::ui;
use crate::core::{ConversionDefaults, DateArg, Evaluated, InflationTable, PriceArg, evaluate};
use crate::providers::csv_table::read_price_grid;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use comfy_table::{Cell, Table};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct AdjustOptions {
    pub from: Vec<NaiveDate>,
    pub to: Vec<NaiveDate>,
    pub prices: Vec<f64>,
    pub price_grid: Option<PathBuf>,
    pub growth_rate: Option<f64>,
}

/// A single value stays a scalar, several become a range; none falls back to
/// the caller's default.
pub fn date_arg(dates: &[NaiveDate]) -> Option<DateArg> {
    match dates {
        [] => None,
        [date] => Some(DateArg::Scalar(*date)),
        dates => Some(DateArg::Sequence(dates.iter().copied().map(Some).collect())),
    }
}

pub fn price_arg(options: &AdjustOptions) -> Result<PriceArg> {
    match (&options.price_grid, options.prices.as_slice()) {
        (Some(_), [_, ..]) => bail!("Use either --price or --price-grid, not both"),
        (Some(path), []) => Ok(PriceArg::Grid(read_price_grid(path)?)),
        (None, []) => bail!("No prices given; pass --price or --price-grid"),
        (None, [price]) => Ok(PriceArg::Scalar(Some(*price))),
        (None, prices) => Ok(PriceArg::Sequence(
            prices.iter().copied().map(Some).collect(),
        )),
    }
}

pub fn run(
    options: &AdjustOptions,
    table: &InflationTable,
    defaults: &ConversionDefaults,
) -> Result<Evaluated> {
    let original_date = defaults.date_or_today(date_arg(&options.from));
    let target_date = defaults.date_or_today(date_arg(&options.to));
    let prices = price_arg(options)?;
    let growth_rate = defaults.growth_rate_or_default(options.growth_rate);
    debug!(?original_date, ?target_date, growth_rate, "Evaluating conversion");

    let result = evaluate(&original_date, &prices, &target_date, table, growth_rate)?;
    println!("{}", render(&original_date, &prices, &target_date, &result));
    Ok(result)
}

fn date_at(arg: &DateArg, i: usize) -> Option<NaiveDate> {
    match arg {
        DateArg::Scalar(date) => Some(*date),
        DateArg::Sequence(dates) => dates.get(i).copied().flatten(),
    }
}

fn price_at(arg: &PriceArg, i: usize) -> Option<f64> {
    match arg {
        PriceArg::Scalar(price) => *price,
        PriceArg::Sequence(prices) => prices.get(i).copied().flatten(),
        PriceArg::Grid(_) => None,
    }
}

fn date_cell(date: Option<NaiveDate>) -> Cell {
    ui::format_optional_cell(date, |d| d.format("%Y-%m-%d").to_string())
}

fn value_cell(value: Option<f64>) -> Cell {
    value.map_or_else(ui::na_cell, ui::amount_cell)
}

fn render(original: &DateArg, prices: &PriceArg, target: &DateArg, result: &Evaluated) -> Table {
    let mut table = ui::new_styled_table();

    match result {
        Evaluated::Grid(rows) => {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            let row_dates = match (original, target) {
                (DateArg::Sequence(_), _) => Some(original),
                (_, DateArg::Sequence(_)) => Some(target),
                _ => None,
            };

            let mut header = vec![ui::header_cell("Date")];
            header.extend((1..=width).map(|j| ui::header_cell(&format!("#{j}"))));
            table.set_header(header);

            for (i, row) in rows.iter().enumerate() {
                let mut cells = vec![match row_dates {
                    Some(arg) => date_cell(date_at(arg, i)),
                    None => Cell::new(ui::style_text("-", ui::StyleType::Subtle)),
                }];
                cells.extend(row.iter().map(|value| value_cell(*value)));
                table.add_row(cells);
            }
        }
        Evaluated::Sequence(values) => {
            set_pair_header(&mut table);
            for (i, value) in values.iter().enumerate() {
                table.add_row(vec![
                    date_cell(date_at(original, i)),
                    ui::format_optional_cell(price_at(prices, i), |p| format!("{p:.2}")),
                    date_cell(date_at(target, i)),
                    value_cell(*value),
                ]);
            }
        }
        Evaluated::Scalar(value) => {
            set_pair_header(&mut table);
            table.add_row(vec![
                date_cell(date_at(original, 0)),
                ui::format_optional_cell(price_at(prices, 0), |p| format!("{p:.2}")),
                date_cell(date_at(target, 0)),
                value_cell(*value),
            ]);
        }
    }

    table
}

fn set_pair_header(table: &mut Table) {
    table.set_header(vec![
        ui::header_cell("Original date"),
        ui::header_cell("Price"),
        ui::header_cell("Target date"),
        ui::header_cell("Adjusted"),
    ]);
}
